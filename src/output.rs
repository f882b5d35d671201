use crate::models::{ExperimentResult, MetricTable};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Print experiment results in the specified format
pub fn print_results(results: &[ExperimentResult], format: OutputFormat) {
    match format {
        OutputFormat::Plain => print_plain(results),
        OutputFormat::Json => print_json(results),
    }
}

/// Print results in plain text format
fn print_plain(results: &[ExperimentResult]) {
    for (i, result) in results.iter().enumerate() {
        match &result.compare_with {
            Some(other) => println!(
                "=== Experiment {}: {} ({} vs {}) ===",
                i + 1,
                result.title,
                result.model,
                other
            ),
            None => println!("=== Experiment {}: {} ({}) ===", i + 1, result.title, result.model),
        }
        println!();

        println!("📊 METRICS");
        println!("----------");
        print!("{}", format_table(&result.table));
        println!();

        println!("📝 SUMMARY");
        println!("----------");
        println!("{}", result.summary);

        if i < results.len() - 1 {
            println!("{}", "=".repeat(50));
            println!();
        }
    }
}

/// Metric grid with one column per segment; unavailable cells show as `n/a`
pub fn format_table(table: &MetricTable) -> String {
    if table.rows().is_empty() {
        return "No metrics available.\n".to_string();
    }

    let name_width = table
        .rows()
        .iter()
        .map(|row| row.metric.len())
        .max()
        .unwrap_or(0)
        .max("Metric".len());

    let mut out = format!("{:<width$}", "Metric", width = name_width);
    for segment in table.segments() {
        out.push_str(&format!(" {:>10}", segment));
    }
    out.push('\n');
    out.push_str(&"-".repeat(name_width + 11 * table.segments().len()));
    out.push('\n');

    for row in table.rows() {
        out.push_str(&format!("{:<width$}", row.metric, width = name_width));
        for value in &row.values {
            if value.is_nan() {
                out.push_str(&format!(" {:>10}", "n/a"));
            } else {
                out.push_str(&format!(" {:>10.3}", value));
            }
        }
        out.push('\n');
    }

    out
}

/// Print results in JSON format
fn print_json(results: &[ExperimentResult]) {
    match serde_json::to_string_pretty(results) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing results to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricTableBuilder;

    fn create_test_results() -> Vec<ExperimentResult> {
        let mut builder = MetricTableBuilder::new(vec!["total".to_string(), "m1".to_string()]);
        builder
            .row("ttr_mean", vec![0.91234, 1.0])
            .row("bleu_reference", vec![f64::NAN, f64::NAN]);

        vec![ExperimentResult {
            title: "greeting".to_string(),
            model: "gpt-4.1".to_string(),
            compare_with: None,
            table: builder.build(),
            summary: "INTERNAL CONSISTENCY SUMMARY (total)".to_string(),
        }]
    }

    #[test]
    fn test_format_table() {
        let results = create_test_results();
        let grid = format_table(&results[0].table);
        let lines: Vec<&str> = grid.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Metric"));
        assert!(lines[0].contains("total") && lines[0].contains("m1"));
        assert!(lines[2].contains("0.912"));
        assert!(lines[3].contains("n/a"));
        assert!(!grid.contains("NaN"));
    }

    #[test]
    fn test_format_empty_table() {
        let table = MetricTableBuilder::new(vec!["total".to_string()]).build();
        assert_eq!(format_table(&table), "No metrics available.\n");
    }

    #[test]
    fn test_json_serialization() {
        let results = create_test_results();
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json[0]["title"], "greeting");
        assert!(json[0].get("compare_with").is_none());
        assert_eq!(json[0]["table"]["rows"][1]["values"][0], serde_json::Value::Null);
    }

    #[test]
    fn test_print_results_both_formats() {
        let mut results = create_test_results();
        results.push(ExperimentResult {
            compare_with: Some("haiku".to_string()),
            ..results[0].clone()
        });
        print_results(&results, OutputFormat::Plain);
        print_results(&results, OutputFormat::Json);
        print_results(&[], OutputFormat::Json);
    }
}
