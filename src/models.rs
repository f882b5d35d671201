use serde::{Deserialize, Serialize};

/// One sampled token and its log-probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenLogprob {
    pub token: String,
    pub logprob: f64,
}

/// An assistant reply within one conversation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// The generated text
    pub content: String,
    /// Per-token log-probabilities, empty when not requested or not supported
    #[serde(default)]
    pub token_logprobs: Vec<TokenLogprob>,
}

#[cfg(test)]
impl AssistantMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            token_logprobs: Vec::new(),
        }
    }
}

/// One full execution of the prompt sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationResult {
    /// Assistant replies in prompt order
    pub assistant_messages: Vec<AssistantMessage>,
}

/// Metric-by-segment table. Cells are NaN when a metric is not available,
/// which serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTable {
    segments: Vec<String>,
    rows: Vec<MetricRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub metric: String,
    pub values: Vec<f64>,
}

impl MetricTable {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    /// Raw cell value, NaN included. `None` only for an unknown row or column.
    pub fn value(&self, metric: &str, segment: &str) -> Option<f64> {
        let column = self.segments.iter().position(|s| s == segment)?;
        let row = self.rows.iter().find(|r| r.metric == metric)?;
        row.values.get(column).copied()
    }

    /// Measured cell value; `None` when the row, the column or the
    /// measurement is missing.
    pub fn get(&self, metric: &str, segment: &str) -> Option<f64> {
        self.value(metric, segment).filter(|v| !v.is_nan())
    }
}

#[cfg(test)]
impl MetricTable {
    pub fn has_metric(&self, metric: &str) -> bool {
        self.rows.iter().any(|r| r.metric == metric)
    }
}

/// Assembles a [`MetricTable`]. Every row must carry one value per segment.
#[derive(Debug)]
pub struct MetricTableBuilder {
    segments: Vec<String>,
    rows: Vec<MetricRow>,
}

impl MetricTableBuilder {
    pub fn new(segments: Vec<String>) -> Self {
        Self {
            segments,
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, metric: impl Into<String>, values: Vec<f64>) -> &mut Self {
        assert_eq!(
            values.len(),
            self.segments.len(),
            "metric row must have one value per segment"
        );
        self.rows.push(MetricRow {
            metric: metric.into(),
            values,
        });
        self
    }

    /// Copy every row of `table` under `<metric><suffix>`.
    pub fn rows_from(&mut self, table: &MetricTable, suffix: &str) -> &mut Self {
        for row in table.rows() {
            self.row(format!("{}{}", row.metric, suffix), row.values.clone());
        }
        self
    }

    pub fn build(self) -> MetricTable {
        MetricTable {
            segments: self.segments,
            rows: self.rows,
        }
    }
}

/// Outcome of one configured experiment
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentResult {
    pub title: String,
    pub model: String,
    /// Second model of a cross-model experiment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_with: Option<String>,
    pub table: MetricTable,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_table() -> MetricTable {
        let mut builder = MetricTableBuilder::new(vec!["total".to_string(), "m1".to_string()]);
        builder.row("ttr_mean", vec![0.8, f64::NAN]);
        builder.row("bleu_internal", vec![12.5, 40.0]);
        builder.build()
    }

    #[test]
    fn test_table_lookup() {
        let table = create_test_table();
        assert_eq!(table.segments(), ["total", "m1"]);
        assert_eq!(table.get("ttr_mean", "total"), Some(0.8));
        assert_eq!(table.get("bleu_internal", "m1"), Some(40.0));
        assert!(table.has_metric("ttr_mean"));
        assert!(!table.has_metric("rougeL_internal"));
    }

    #[test]
    fn test_not_available_is_distinct_from_missing() {
        let table = create_test_table();
        assert!(table.value("ttr_mean", "m1").unwrap().is_nan());
        assert_eq!(table.get("ttr_mean", "m1"), None);
        assert_eq!(table.value("ttr_mean", "m9"), None);
        assert_eq!(table.value("unknown", "total"), None);
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let json = serde_json::to_value(create_test_table()).unwrap();
        assert_eq!(json["rows"][0]["values"][1], serde_json::Value::Null);
        assert_eq!(json["rows"][0]["values"][0], serde_json::json!(0.8));
    }

    #[test]
    fn test_rows_from_suffixes_names() {
        let table = create_test_table();
        let mut builder = MetricTableBuilder::new(table.segments().to_vec());
        builder.rows_from(&table, "_model_a");
        let suffixed = builder.build();
        assert!(suffixed.has_metric("ttr_mean_model_a"));
        assert_eq!(suffixed.get("bleu_internal_model_a", "total"), Some(12.5));
    }

    #[test]
    #[should_panic(expected = "one value per segment")]
    fn test_row_length_mismatch_panics() {
        let mut builder = MetricTableBuilder::new(vec!["total".to_string()]);
        builder.row("ttr_mean", vec![1.0, 2.0]);
    }

    #[test]
    fn test_conversation_result_deserializes_without_logprobs() {
        let json = r#"{"assistant_messages": [{"content": "hi"}]}"#;
        let result: ConversationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.assistant_messages[0], AssistantMessage::text("hi"));
    }
}
