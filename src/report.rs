//! Human-readable summaries of metric tables. Cells that were not measured
//! are left out, never printed as zero.

use crate::models::MetricTable;
use crate::segments::TOTAL_SEGMENT;

/// Heading followed by a dashed underline of the same width
fn heading(lines: &mut Vec<String>, title: String) {
    let underline = "-".repeat(title.chars().count());
    lines.push(title);
    lines.push(underline);
}

/// Summary of an internal-consistency table, one block per segment.
///
/// `segments` restricts and orders the blocks; unknown labels are skipped.
/// Defaults to every column of the table.
pub fn summarize_internal(table: &MetricTable, segments: Option<&[String]>) -> String {
    let segments = segments.unwrap_or(table.segments());
    let mut lines: Vec<String> = Vec::new();

    for segment in segments {
        if !table.segments().contains(segment) {
            continue;
        }
        let get = |metric: &str| table.get(metric, segment);

        heading(&mut lines, format!("INTERNAL CONSISTENCY SUMMARY ({})", segment));

        if let (Some(mean), Some(std)) = (get("length_tokens_mean"), get("length_tokens_std")) {
            lines.push(format!(
                "- Length: ~{:.1} tokens on average (std ≈ {:.1} across runs).",
                mean, std
            ));
        }
        if let (Some(mean), Some(std)) = (get("ttr_mean"), get("ttr_std")) {
            lines.push(format!(
                "- Type-token ratio (lexical diversity): mean ≈ {:.3}, std ≈ {:.3}.",
                mean, std
            ));
        }
        if let (Some(mean), Some(std)) = (
            get("avg_sentence_length_mean"),
            get("avg_sentence_length_std"),
        ) {
            lines.push(format!(
                "- Average sentence length: ≈ {:.1} tokens per sentence (std ≈ {:.1}).",
                mean, std
            ));
        }
        if let (Some(flesch), Some(kincaid)) = (
            get("readability_flesch_mean"),
            get("readability_kincaid_mean"),
        ) {
            lines.push(format!(
                "- Readability (Flesch ≈ {:.1}, Flesch-Kincaid grade ≈ {:.1}).",
                flesch, kincaid
            ));
        }

        lines.push(String::new());
        lines.push("Lexical / semantic stability across runs:".to_string());
        if let Some(v) = get("tfidf_cosine_internal") {
            lines.push(format!("- TF-IDF cosine similarity: {:.3} (1.0 = identical).", v));
        }
        if let Some(v) = get("ngram_jaccard_bigram_internal") {
            lines.push(format!(
                "- Bigram Jaccard overlap: {:.3} (1.0 = identical bigrams).",
                v
            ));
        }
        if let Some(v) = get("bleu_internal") {
            lines.push(format!("- BLEU (pairwise mean): {:.1} (0-100 scale).", v));
        }
        if let Some(v) = get("rougeL_internal") {
            lines.push(format!("- ROUGE-L F1 (pairwise mean): {:.3}.", v));
        }
        if let Some(v) = get("style_similarity_internal") {
            lines.push(format!(
                "- Style similarity (TTR and sentence length): {:.3} (1.0 = same style).",
                v
            ));
        }
        if let Some(v) = get("pos_distribution_similarity_internal") {
            lines.push(format!(
                "- POS distribution similarity: {:.3} (1.0 = same part-of-speech mix).",
                v
            ));
        }

        let reference = [
            ("TF-IDF cosine", get("tfidf_cosine_reference"), 3usize),
            ("Bigram Jaccard", get("ngram_jaccard_bigram_reference"), 3),
            ("BLEU", get("bleu_reference"), 1),
            ("ROUGE-L F1", get("rougeL_reference"), 3),
            ("Style similarity", get("style_similarity_reference"), 3),
            ("POS distribution similarity", get("pos_distribution_similarity_reference"), 3),
        ];
        if reference.iter().any(|(_, v, _)| v.is_some()) {
            lines.push(String::new());
            lines.push("Similarity to reference:".to_string());
            for (label, value, precision) in reference {
                if let Some(v) = value {
                    lines.push(format!("- {} vs reference: {:.*}.", label, precision, v));
                }
            }
        }

        if let (Some(mean), Some(std)) = (
            get("confidence_avg_logprob_mean"),
            get("confidence_avg_logprob_std"),
        ) {
            lines.push(String::new());
            lines.push("Confidence:".to_string());
            lines.push(format!(
                "- Avg token log-prob: mean ≈ {:.3}, std ≈ {:.3} (higher = more confident).",
                mean, std
            ));
        }

        // blank line between segments
        lines.push(String::new());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Summary of a cross-model table, read from the `total` column.
pub fn summarize_external(table: &MetricTable, model_a: &str, model_b: &str) -> String {
    let get = |metric: &str| table.get(metric, TOTAL_SEGMENT);
    let pair = |metric: &str| {
        (
            get(&format!("{}_model_a", metric)),
            get(&format!("{}_model_b", metric)),
        )
    };
    let mut lines: Vec<String> = Vec::new();

    heading(
        &mut lines,
        format!("EXTERNAL CONSISTENCY SUMMARY ({} vs {})", model_a, model_b),
    );

    lines.push("Internal stability (each model against itself):".to_string());
    match pair("tfidf_cosine_internal") {
        (Some(a), Some(b)) => {
            let steadier = if a >= b { model_a } else { model_b };
            lines.push(format!(
                "- TF-IDF cosine internal: {} ≈ {:.3}, {} ≈ {:.3}; {} is lexically steadier.",
                model_a, a, model_b, b, steadier
            ));
        }
        (a, b) => {
            for (model, value) in [(model_a, a), (model_b, b)] {
                if let Some(v) = value {
                    lines.push(format!("- {} TF-IDF internal: {:.3}.", model, v));
                }
            }
        }
    }
    if let (Some(a), Some(b)) = pair("bleu_internal") {
        lines.push(format!(
            "- BLEU internal (0-100): {} ≈ {:.1}, {} ≈ {:.1}.",
            model_a, a, model_b, b
        ));
    }
    if let (Some(a), Some(b)) = pair("rougeL_internal") {
        lines.push(format!(
            "- ROUGE-L internal: {} ≈ {:.3}, {} ≈ {:.3}.",
            model_a, a, model_b, b
        ));
    }

    lines.push(String::new());
    lines.push("Similarity between models:".to_string());
    let between = [
        ("TF-IDF cosine", "tfidf_cosine", 3usize),
        ("Bigram Jaccard", "ngram_jaccard_bigram", 3),
        ("BLEU (0-100)", "bleu", 1),
        ("ROUGE-L", "rougeL", 3),
        ("Style similarity", "style_similarity", 3),
        ("POS distribution similarity", "pos_distribution_similarity", 3),
    ];
    for (label, family, precision) in between {
        if let Some(v) = get(&format!("{}_between_models", family)) {
            lines.push(format!("- {} between models: {:.*}.", label, precision, v));
        }
    }

    let alignment = [
        ("TF-IDF", pair("tfidf_cosine_reference"), 3usize),
        ("BLEU (0-100)", pair("bleu_reference"), 1),
        ("ROUGE-L", pair("rougeL_reference"), 3),
    ];
    if alignment.iter().any(|(_, (a, b), _)| a.is_some() || b.is_some()) {
        lines.push(String::new());
        lines.push("Alignment with reference:".to_string());
        for (label, values, precision) in alignment {
            if let (Some(a), Some(b)) = values {
                let mut line = format!(
                    "- {} vs reference: {} ≈ {:.*}, {} ≈ {:.*}",
                    label, model_a, precision, a, model_b, precision, b
                );
                if label == "TF-IDF" {
                    let closer = if a >= b { model_a } else { model_b };
                    line.push_str(&format!("; {} is closer in bag-of-words space", closer));
                }
                line.push('.');
                lines.push(line);
            }
        }
    }

    let (mean_a, mean_b) = pair("confidence_avg_logprob_mean");
    let (std_a, std_b) = pair("confidence_avg_logprob_std");
    let confidence = [(model_a, mean_a, std_a), (model_b, mean_b, std_b)];
    if confidence.iter().any(|(_, mean, _)| mean.is_some()) {
        lines.push(String::new());
        lines.push("Confidence (avg token log-prob):".to_string());
        for (model, mean, std) in confidence {
            if let (Some(mean), Some(std)) = (mean, std) {
                lines.push(format!("- {}: mean ≈ {:.3}, std ≈ {:.3}.", model, mean, std));
            }
        }
    }

    lines.join("\n")
}
