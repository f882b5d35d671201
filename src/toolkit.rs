//! Optional analysis capabilities.
//!
//! Each capability sits behind a trait so callers can run with the built-in
//! implementations, with none at all, or with their own. A missing capability
//! never fails a computation; the affected metric is reported as not available.

use crate::pos::{LexiconTagger, PosDistribution};
use crate::readability::FleschReadability;
use crate::tfidf::SmoothTfIdf;
use std::collections::HashMap;
use std::sync::Arc;

/// Scores a text as `(flesch_reading_ease, flesch_kincaid_grade)`.
pub trait ReadabilityScorer: Send + Sync {
    fn score(&self, text: &str) -> Option<(f64, f64)>;
}

/// Assigns one Penn-style tag per word token.
pub trait PosTagger: Send + Sync {
    fn tag(&self, text: &str) -> Vec<String>;
}

/// Sparse TF-IDF row keyed by term.
pub type TermVector = HashMap<String, f64>;

/// Fits a TF-IDF model on `documents` and returns one L2-normalised row per
/// document, or `None` when the documents share no usable vocabulary.
pub trait TfIdfVectorizer: Send + Sync {
    fn fit_transform(&self, documents: &[&str]) -> Option<Vec<TermVector>>;
}

#[derive(Clone, Default)]
pub struct AnalysisToolkit {
    readability: Option<Arc<dyn ReadabilityScorer>>,
    tagger: Option<Arc<dyn PosTagger>>,
    vectorizer: Option<Arc<dyn TfIdfVectorizer>>,
}

impl AnalysisToolkit {
    /// All built-in capabilities enabled
    pub fn full() -> Self {
        Self::degraded()
            .with_readability(Arc::new(FleschReadability))
            .with_tagger(Arc::new(LexiconTagger))
            .with_vectorizer(Arc::new(SmoothTfIdf))
    }

    /// No optional capability at all
    pub fn degraded() -> Self {
        Self::default()
    }

    pub fn with_readability(mut self, scorer: Arc<dyn ReadabilityScorer>) -> Self {
        self.readability = Some(scorer);
        self
    }

    pub fn with_tagger(mut self, tagger: Arc<dyn PosTagger>) -> Self {
        self.tagger = Some(tagger);
        self
    }

    pub fn with_vectorizer(mut self, vectorizer: Arc<dyn TfIdfVectorizer>) -> Self {
        self.vectorizer = Some(vectorizer);
        self
    }

    /// Readability pair, NaN for both values when the text is blank or no
    /// scorer is installed.
    pub fn readability(&self, text: &str) -> (f64, f64) {
        if text.trim().is_empty() {
            return (f64::NAN, f64::NAN);
        }
        self.readability
            .as_ref()
            .and_then(|scorer| scorer.score(text))
            .unwrap_or((f64::NAN, f64::NAN))
    }

    /// Coarse POS distribution. Without a tagger every category weighs 0.2,
    /// which keeps cosine comparisons defined but carries no information.
    pub fn pos_distribution(&self, text: &str) -> PosDistribution {
        match &self.tagger {
            Some(tagger) => PosDistribution::from_tags(&tagger.tag(text)),
            None => PosDistribution::uniform(),
        }
    }

    pub fn tfidf(&self, documents: &[&str]) -> Option<Vec<TermVector>> {
        match &self.vectorizer {
            Some(vectorizer) => vectorizer.fit_transform(documents),
            None => {
                tracing::debug!("no TF-IDF vectorizer installed, skipping");
                None
            }
        }
    }
}
