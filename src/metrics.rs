//! The six similarity families and how runs are paired up for each.

use crate::similarity::{
    bigram_jaccard, corpus_bleu, rouge_l_f1_tokens, rouge_tokens, sentence_bleu,
    style_similarity,
};
use crate::text::lexical_diversity;
use crate::tfidf;
use crate::toolkit::AnalysisToolkit;

/// Which texts a family is measured between.
#[derive(Debug, Clone, Copy)]
pub enum Comparison<'a> {
    /// Every unordered pair of runs `(i, j)` with `i < j`
    AllPairs,
    /// Every run against one fixed text
    Anchor(&'a str),
    /// Every run against every run of a second set
    Cross(&'a [String]),
}

/// The same pairing, over precomputed per-text features.
pub enum Pairing<'a, T> {
    AllPairs,
    Anchor(&'a T),
    Cross(&'a [T]),
}

/// Mean of `similarity` over the pairs `pairing` selects. The earlier run,
/// the anchor, or the run of the first set is passed on the left.
///
/// `None` when there is no pair to average.
pub fn aggregate<T>(
    runs: &[T],
    pairing: Pairing<'_, T>,
    similarity: impl Fn(&T, &T) -> f64,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;

    match pairing {
        Pairing::AllPairs => {
            for (i, left) in runs.iter().enumerate() {
                for right in &runs[i + 1..] {
                    sum += similarity(left, right);
                    count += 1;
                }
            }
        }
        Pairing::Anchor(anchor) => {
            for run in runs {
                sum += similarity(anchor, run);
                count += 1;
            }
        }
        Pairing::Cross(others) => {
            for left in runs {
                for right in others {
                    sum += similarity(left, right);
                    count += 1;
                }
            }
        }
    }

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFamily {
    TfIdfCosine,
    BigramJaccard,
    Bleu,
    RougeL,
    StyleSimilarity,
    PosDistributionSimilarity,
}

impl MetricFamily {
    pub const ALL: [MetricFamily; 6] = [
        MetricFamily::TfIdfCosine,
        MetricFamily::BigramJaccard,
        MetricFamily::Bleu,
        MetricFamily::RougeL,
        MetricFamily::StyleSimilarity,
        MetricFamily::PosDistributionSimilarity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MetricFamily::TfIdfCosine => "tfidf_cosine",
            MetricFamily::BigramJaccard => "ngram_jaccard_bigram",
            MetricFamily::Bleu => "bleu",
            MetricFamily::RougeL => "rougeL",
            MetricFamily::StyleSimilarity => "style_similarity",
            MetricFamily::PosDistributionSimilarity => "pos_distribution_similarity",
        }
    }

    /// Mean over all run pairs; needs at least two runs.
    pub fn internal(self, texts: &[String], toolkit: &AnalysisToolkit) -> Option<f64> {
        if texts.len() < 2 {
            return None;
        }
        self.compute(texts, Comparison::AllPairs, toolkit)
    }

    /// Mean against the anchor; needs a non-empty anchor and at least one run.
    pub fn reference(
        self,
        texts: &[String],
        anchor: Option<&str>,
        toolkit: &AnalysisToolkit,
    ) -> Option<f64> {
        let anchor = anchor.filter(|a| !a.is_empty())?;
        if texts.is_empty() {
            return None;
        }
        self.compute(texts, Comparison::Anchor(anchor), toolkit)
    }

    /// Mean over every (first-set run, second-set run) pair.
    pub fn between(self, first: &[String], second: &[String], toolkit: &AnalysisToolkit) -> Option<f64> {
        if first.is_empty() || second.is_empty() {
            return None;
        }
        self.compute(first, Comparison::Cross(second), toolkit)
    }

    fn compute(self, texts: &[String], comparison: Comparison<'_>, toolkit: &AnalysisToolkit) -> Option<f64> {
        match self {
            MetricFamily::TfIdfCosine => tfidf_cosine(texts, comparison, toolkit),
            MetricFamily::BigramJaccard => {
                with_features(texts, comparison, str::to_owned, |a, b| bigram_jaccard(a, b))
            }
            MetricFamily::Bleu => bleu(texts, comparison),
            // left side plays the reference
            MetricFamily::RougeL => with_features(texts, comparison, rouge_tokens, |r, h| {
                rouge_l_f1_tokens(r, h)
            }),
            MetricFamily::StyleSimilarity => {
                with_features(texts, comparison, lexical_diversity, style_similarity)
            }
            MetricFamily::PosDistributionSimilarity => with_features(
                texts,
                comparison,
                |t| toolkit.pos_distribution(t),
                |a, b| a.cosine(b),
            ),
        }
    }
}

/// Precompute one feature per text, then aggregate.
fn with_features<T>(
    texts: &[String],
    comparison: Comparison<'_>,
    feature: impl Fn(&str) -> T,
    similarity: impl Fn(&T, &T) -> f64,
) -> Option<f64> {
    let runs: Vec<T> = texts.iter().map(|t| feature(t)).collect();
    match comparison {
        Comparison::AllPairs => aggregate(&runs, Pairing::AllPairs, similarity),
        Comparison::Anchor(anchor) => {
            let anchor = feature(anchor);
            aggregate(&runs, Pairing::Anchor(&anchor), similarity)
        }
        Comparison::Cross(others) => {
            let others: Vec<T> = others.iter().map(|t| feature(t)).collect();
            aggregate(&runs, Pairing::Cross(&others), similarity)
        }
    }
}

/// TF-IDF is fitted once over every text taking part, anchor included.
fn tfidf_cosine(texts: &[String], comparison: Comparison<'_>, toolkit: &AnalysisToolkit) -> Option<f64> {
    let mut corpus: Vec<&str> = Vec::with_capacity(texts.len() + 1);
    if let Comparison::Anchor(anchor) = comparison {
        corpus.push(anchor);
    }
    corpus.extend(texts.iter().map(String::as_str));
    if let Comparison::Cross(others) = comparison {
        corpus.extend(others.iter().map(String::as_str));
    }

    let rows = toolkit.tfidf(&corpus)?;
    match comparison {
        Comparison::AllPairs => aggregate(&rows, Pairing::AllPairs, tfidf::cosine),
        Comparison::Anchor(_) => aggregate(&rows[1..], Pairing::Anchor(&rows[0]), tfidf::cosine),
        Comparison::Cross(_) => {
            let (first, second) = rows.split_at(texts.len());
            aggregate(first, Pairing::Cross(second), tfidf::cosine)
        }
    }
}

/// Pairwise BLEU takes the left run as hypothesis. Against an anchor, all
/// runs are scored as one corpus.
fn bleu(texts: &[String], comparison: Comparison<'_>) -> Option<f64> {
    match comparison {
        Comparison::Anchor(anchor) => {
            let hypotheses: Vec<&str> = texts.iter().map(String::as_str).collect();
            let references = vec![anchor; hypotheses.len()];
            Some(corpus_bleu(&hypotheses, &references))
        }
        _ => with_features(texts, comparison, str::to_owned, |h, r| sentence_bleu(h, r)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_aggregate_all_pairs() {
        let runs: [f64; 3] = [1.0, 2.0, 4.0];
        // |1-2|, |1-4|, |2-4|
        let mean = aggregate(&runs, Pairing::AllPairs, |a, b| (a - b).abs()).unwrap();
        assert!((mean - 2.0).abs() < 1e-12);
        assert_eq!(aggregate(&[1.0], Pairing::AllPairs, |a: &f64, b: &f64| a + b), None);
    }

    #[test]
    fn test_aggregate_anchor_and_cross() {
        let runs: [f64; 2] = [1.0, 3.0];
        assert_eq!(aggregate(&runs, Pairing::Anchor(&0.0), |a, b| b - a), Some(2.0));
        let others = [10.0];
        assert_eq!(aggregate(&runs, Pairing::Cross(&others[..]), |a, b| b - a), Some(8.0));
        assert_eq!(aggregate::<f64>(&[], Pairing::Anchor(&0.0), |a, b| a + b), None);
    }

    #[test]
    fn test_internal_needs_two_runs() {
        let toolkit = AnalysisToolkit::full();
        for family in MetricFamily::ALL {
            assert_eq!(family.internal(&texts(&["only run"]), &toolkit), None, "{}", family.name());
            assert_eq!(family.internal(&[], &toolkit), None);
        }
    }

    #[test]
    fn test_reference_needs_anchor() {
        let toolkit = AnalysisToolkit::full();
        let runs = texts(&["a text", "another text"]);
        for family in MetricFamily::ALL {
            assert_eq!(family.reference(&runs, None, &toolkit), None);
            assert_eq!(family.reference(&runs, Some(""), &toolkit), None);
            assert_eq!(family.reference(&[], Some("anchor"), &toolkit), None);
            assert!(family.reference(&runs, Some("a text"), &toolkit).is_some());
        }
    }

    #[test]
    fn test_identical_runs() {
        let toolkit = AnalysisToolkit::full();
        let runs = texts(&["hello", "hello", "hello"]);
        let tfidf = MetricFamily::TfIdfCosine.internal(&runs, &toolkit).unwrap();
        assert!((tfidf - 1.0).abs() < 1e-9);
        assert_eq!(MetricFamily::BigramJaccard.internal(&runs, &toolkit), Some(1.0));
        assert_eq!(MetricFamily::StyleSimilarity.internal(&runs, &toolkit), Some(1.0));
        assert_eq!(MetricFamily::RougeL.internal(&runs, &toolkit), Some(1.0));
        // fewer than four tokens leaves BLEU without 4-grams
        assert_eq!(MetricFamily::Bleu.internal(&runs, &toolkit), Some(0.0));
    }

    #[test]
    fn test_tfidf_degrades_without_vectorizer() {
        let runs = texts(&["one text", "two texts"]);
        let degraded = AnalysisToolkit::degraded();
        assert_eq!(MetricFamily::TfIdfCosine.internal(&runs, &degraded), None);
        assert_eq!(MetricFamily::TfIdfCosine.reference(&runs, Some("text"), &degraded), None);
        // the other families still measure
        assert!(MetricFamily::RougeL.internal(&runs, &degraded).is_some());
    }

    #[test]
    fn test_pos_similarity_uniform_when_degraded() {
        let runs = texts(&["The dog runs.", "Quickly!"]);
        let value = MetricFamily::PosDistributionSimilarity
            .internal(&runs, &AnalysisToolkit::degraded())
            .unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bleu_reference_is_corpus_level() {
        let toolkit = AnalysisToolkit::full();
        let anchor = "the quick brown fox jumps over the lazy dog";
        let runs = texts(&[anchor, "the quick brown fox jumps over the dog"]);
        let value = MetricFamily::Bleu.reference(&runs, Some(anchor), &toolkit).unwrap();
        let expected = corpus_bleu(&[runs[0].as_str(), runs[1].as_str()], &[anchor, anchor]);
        assert_eq!(value, expected);
    }

    #[test]
    fn test_bleu_internal_disjoint_runs_is_zero() {
        let toolkit = AnalysisToolkit::full();
        let runs = texts(&["alpha beta gamma delta epsilon", "one two three four five"]);
        assert_eq!(MetricFamily::Bleu.internal(&runs, &toolkit), Some(0.0));
        assert_eq!(MetricFamily::Bleu.between(&runs[..1], &runs[1..], &toolkit), Some(0.0));
    }

    #[test]
    fn test_between_models() {
        let toolkit = AnalysisToolkit::full();
        let first = texts(&["the cat sat on the mat", "the cat sat on the mat"]);
        let second = texts(&["the cat sat on the mat"]);
        for family in [MetricFamily::BigramJaccard, MetricFamily::RougeL, MetricFamily::StyleSimilarity] {
            assert_eq!(family.between(&first, &second, &toolkit), Some(1.0));
        }
        let tfidf = MetricFamily::TfIdfCosine.between(&first, &second, &toolkit).unwrap();
        assert!((tfidf - 1.0).abs() < 1e-9);
        assert_eq!(MetricFamily::Bleu.between(&first, &[], &toolkit), None);
    }

    #[test]
    fn test_reference_rouge_uses_anchor_as_reference() {
        let toolkit = AnalysisToolkit::full();
        let runs = texts(&["the cat lay on mat"]);
        let value = MetricFamily::RougeL
            .reference(&runs, Some("the cat sat on the mat"), &toolkit)
            .unwrap();
        let expected = rouge_l_f1_tokens(
            &rouge_tokens("the cat sat on the mat"),
            &rouge_tokens("the cat lay on mat"),
        );
        assert_eq!(value, expected);
    }
}
