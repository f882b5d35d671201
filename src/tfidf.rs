use crate::toolkit::{TermVector, TfIdfVectorizer};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("term pattern is valid"));

/// Lowercased terms of two or more word characters, smoothed idf
/// `ln((1 + n) / (1 + df)) + 1`, raw counts as tf, L2-normalised rows.
pub struct SmoothTfIdf;

impl TfIdfVectorizer for SmoothTfIdf {
    fn fit_transform(&self, documents: &[&str]) -> Option<Vec<TermVector>> {
        let counts: Vec<HashMap<String, usize>> =
            documents.iter().map(|doc| term_counts(doc)).collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for doc in &counts {
            for term in doc.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }
        if document_frequency.is_empty() {
            tracing::debug!("empty TF-IDF vocabulary across {} documents", documents.len());
            return None;
        }

        let n = documents.len() as f64;
        let rows = counts
            .iter()
            .map(|doc| {
                let mut row: TermVector = doc
                    .iter()
                    .map(|(term, &count)| {
                        let df = document_frequency[term.as_str()] as f64;
                        let idf = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
                        (term.clone(), count as f64 * idf)
                    })
                    .collect();
                let norm = row.values().map(|w| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    row.values_mut().for_each(|w| *w /= norm);
                }
                row
            })
            .collect();

        Some(rows)
    }
}

fn term_counts(document: &str) -> HashMap<String, usize> {
    let lower = document.to_lowercase();
    let mut counts = HashMap::new();
    for term in TERM.find_iter(&lower) {
        *counts.entry(term.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Dot product of two normalised rows, which is their cosine similarity.
pub fn cosine(a: &TermVector, b: &TermVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, weight)| large.get(term).map(|other| weight * other))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_documents_have_cosine_one() {
        let rows = SmoothTfIdf.fit_transform(&["hello", "hello", "hello"]).unwrap();
        assert_eq!(rows.len(), 3);
        assert!((cosine(&rows[0], &rows[1]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_documents_have_cosine_zero() {
        let rows = SmoothTfIdf.fit_transform(&["red apples", "blue skies"]).unwrap();
        assert_eq!(cosine(&rows[0], &rows[1]), 0.0);
    }

    #[test]
    fn test_rows_are_normalised() {
        let rows = SmoothTfIdf
            .fit_transform(&["the cat sat on the mat", "the dog sat"])
            .unwrap();
        for row in &rows {
            let norm: f64 = row.values().map(|w| w * w).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-12);
        }
        // single-character tokens are not terms
        assert!(!rows[0].contains_key("a"));
        let sim = cosine(&rows[0], &rows[1]);
        assert!(sim > 0.0 && sim < 1.0);
    }

    #[test]
    fn test_smoothed_idf_weights() {
        let rows = SmoothTfIdf.fit_transform(&["alpha beta", "alpha"]).unwrap();
        // idf(alpha) = ln(3/3) + 1 = 1, idf(beta) = ln(3/2) + 1
        let beta_idf = (1.5f64).ln() + 1.0;
        let norm = (1.0 + beta_idf * beta_idf).sqrt();
        assert!((rows[0]["alpha"] - 1.0 / norm).abs() < 1e-12);
        assert!((rows[0]["beta"] - beta_idf / norm).abs() < 1e-12);
        assert!((rows[1]["alpha"] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_vocabulary_is_unavailable() {
        assert!(SmoothTfIdf.fit_transform(&["a b c", "", "!"]).is_none());
        assert!(SmoothTfIdf.fit_transform(&[]).is_none());
    }

    #[test]
    fn test_document_without_terms_gets_empty_row() {
        let rows = SmoothTfIdf.fit_transform(&["hello world", ""]).unwrap();
        assert!(rows[1].is_empty());
        assert_eq!(cosine(&rows[0], &rows[1]), 0.0);
    }
}
