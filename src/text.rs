//! Surface features of a single text: tokens, sentences, bigrams and
//! lexical diversity.

use std::collections::HashSet;

/// Whitespace tokenizer. Empty tokens are dropped.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Split on runs of `.`, `!` and `?`, keeping the trimmed non-empty parts.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Set of adjacent token pairs.
pub fn bigrams<'a>(tokens: &[&'a str]) -> HashSet<(&'a str, &'a str)> {
    tokens.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Type-token ratio and average sentence length in tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalDiversity {
    pub type_token_ratio: f64,
    pub avg_sentence_length: f64,
}

impl LexicalDiversity {
    /// Euclidean distance between two style vectors (TTR, sentence length).
    pub fn distance(&self, other: &LexicalDiversity) -> f64 {
        let dt = self.type_token_ratio - other.type_token_ratio;
        let dl = self.avg_sentence_length - other.avg_sentence_length;
        (dt * dt + dl * dl).sqrt()
    }
}

pub fn lexical_diversity(text: &str) -> LexicalDiversity {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return LexicalDiversity {
            type_token_ratio: 0.0,
            avg_sentence_length: 0.0,
        };
    }

    let unique: HashSet<&str> = tokens.iter().copied().collect();
    let type_token_ratio = unique.len() as f64 / tokens.len() as f64;

    // Text without terminal punctuation still counts as one sentence
    let sentences = split_sentences(text).len();
    let avg_sentence_length = if sentences == 0 {
        tokens.len() as f64
    } else {
        tokens.len() as f64 / sentences as f64
    };

    LexicalDiversity {
        type_token_ratio,
        avg_sentence_length,
    }
}
