//! Similarity between two texts: bigram overlap, style, ROUGE-L and BLEU.

use crate::text::{bigrams, tokenize, LexicalDiversity};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;
use std::sync::LazyLock;

static STEMMER: LazyLock<Stemmer> = LazyLock::new(|| Stemmer::create(Algorithm::English));

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("non-alphanumeric pattern is valid"));

const BLEU_MAX_ORDER: usize = 4;

/// Jaccard overlap of token bigram sets. Two texts without any bigram are
/// identical (1.0); exactly one without bigrams shares nothing (0.0).
pub fn bigram_jaccard(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    let set_a = bigrams(&tokens_a);
    let set_b = bigrams(&tokens_b);

    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

/// `1 / (1 + distance)` between the (TTR, sentence length) style vectors.
pub fn style_similarity(a: &LexicalDiversity, b: &LexicalDiversity) -> f64 {
    1.0 / (1.0 + a.distance(b))
}

/// Tokens as ROUGE sees them: lowercase alphanumeric runs, with tokens
/// longer than three characters stemmed.
pub fn rouge_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lower, " ")
        .split_whitespace()
        .map(|token| {
            if token.len() > 3 {
                STEMMER.stem(token).into_owned()
            } else {
                token.to_string()
            }
        })
        .collect()
}

/// ROUGE-L F1 over pre-tokenized text.
pub fn rouge_l_f1_tokens(reference: &[String], hypothesis: &[String]) -> f64 {
    if reference.is_empty() || hypothesis.is_empty() {
        return 0.0;
    }
    let lcs = lcs_length(reference, hypothesis);
    if lcs == 0 {
        return 0.0;
    }
    let precision = lcs as f64 / hypothesis.len() as f64;
    let recall = lcs as f64 / reference.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

fn lcs_length(a: &[String], b: &[String]) -> usize {
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            current[j + 1] = if x == y {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Corpus BLEU on a 0-100 scale, one reference per hypothesis.
///
/// Clipped n-gram matches up to order 4 are summed over the whole corpus
/// before the precisions are combined. An order with matches but no hits is
/// smoothed exponentially; an order without any n-gram drives the score to 0.
pub fn corpus_bleu(hypotheses: &[&str], references: &[&str]) -> f64 {
    let mut matches = [0usize; BLEU_MAX_ORDER];
    let mut totals = [0usize; BLEU_MAX_ORDER];
    let mut sys_len = 0usize;
    let mut ref_len = 0usize;

    for (hypothesis, reference) in hypotheses.iter().zip(references) {
        let hyp = tokenize_13a(hypothesis);
        let reference = tokenize_13a(reference);
        sys_len += hyp.len();
        ref_len += reference.len();

        for n in 1..=BLEU_MAX_ORDER {
            let hyp_counts = ngram_counts(&hyp, n);
            let ref_counts = ngram_counts(&reference, n);
            totals[n - 1] += hyp.len().saturating_sub(n - 1);
            matches[n - 1] += hyp_counts
                .iter()
                .map(|(gram, &count)| count.min(ref_counts.get(gram).copied().unwrap_or(0)))
                .sum::<usize>();
        }
    }

    if totals.iter().any(|&t| t == 0) {
        return 0.0;
    }
    if matches.iter().all(|&m| m == 0) {
        return 0.0;
    }

    let mut smooth = 1.0;
    let mut log_sum = 0.0;
    for (&hits, &total) in matches.iter().zip(&totals) {
        let precision = if hits == 0 {
            smooth *= 2.0;
            100.0 / (smooth * total as f64)
        } else {
            100.0 * hits as f64 / total as f64
        };
        log_sum += precision.ln();
    }

    let brevity_penalty = if sys_len < ref_len {
        (1.0 - ref_len as f64 / sys_len as f64).exp()
    } else {
        1.0
    };

    brevity_penalty * (log_sum / BLEU_MAX_ORDER as f64).exp()
}

/// BLEU of a single hypothesis against a single reference.
pub fn sentence_bleu(hypothesis: &str, reference: &str) -> f64 {
    corpus_bleu(&[hypothesis], &[reference])
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// mteval-v13a style tokenisation.
fn tokenize_13a(text: &str) -> Vec<String> {
    let text = text
        .replace("<skipped>", "")
        .replace("-\n", "")
        .replace('\n', " ")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">");

    let chars: Vec<char> = text.chars().collect();
    let mut padded = String::with_capacity(text.len() + 16);
    for (i, &c) in chars.iter().enumerate() {
        let previous = i.checked_sub(1).map(|j| chars[j]);
        let next = chars.get(i + 1).copied();
        let separate = match c {
            // keep "3.14" and "1,000" intact
            '.' | ',' => {
                previous.is_some_and(|p| !p.is_ascii_digit())
                    || next.is_some_and(|n| !n.is_ascii_digit())
            }
            '-' => previous.is_some_and(|p| p.is_ascii_digit()),
            _ => matches!(c, '{'..='~' | '['..='`' | '!'..='&' | '('..='+' | ':'..='@' | '/'),
        };
        if separate {
            padded.push(' ');
            padded.push(c);
            padded.push(' ');
        } else {
            padded.push(c);
        }
    }

    padded.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::lexical_diversity;
    use proptest::prelude::*;

    fn style_similarity_text(a: &str, b: &str) -> f64 {
        style_similarity(&lexical_diversity(a), &lexical_diversity(b))
    }

    fn rouge_l_f1(reference: &str, hypothesis: &str) -> f64 {
        rouge_l_f1_tokens(&rouge_tokens(reference), &rouge_tokens(hypothesis))
    }

    #[test]
    fn test_bigram_jaccard() {
        assert_eq!(bigram_jaccard("the cat sat", "the cat sat"), 1.0);
        assert_eq!(bigram_jaccard("hello", "hello"), 1.0);
        assert_eq!(bigram_jaccard("hello", "hello there"), 0.0);
        assert_eq!(bigram_jaccard("", ""), 1.0);
        // {the cat, cat sat} vs {the cat, cat ran}
        assert!((bigram_jaccard("the cat sat", "the cat ran") - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_style_similarity() {
        assert_eq!(style_similarity_text("One two three.", "One two three."), 1.0);
        let sim = style_similarity_text("Short one.", "A much longer sentence with many many words here");
        assert!(sim > 0.0 && sim < 1.0);
        assert_eq!(style_similarity_text("", ""), 1.0);
    }

    #[test]
    fn test_rouge_tokens_stem_long_words() {
        assert_eq!(
            rouge_tokens("Running, the DOGS ran!"),
            vec!["run", "the", "dog", "ran"]
        );
        assert!(rouge_tokens("  ...  ").is_empty());
    }

    #[test]
    fn test_rouge_l() {
        assert!((rouge_l_f1("the cat sat on the mat", "the cat sat on the mat") - 1.0).abs() < 1e-12);
        assert_eq!(rouge_l_f1("alpha beta", "gamma delta"), 0.0);
        assert_eq!(rouge_l_f1("", "anything"), 0.0);

        // LCS "the cat on mat" = 4 of 6 reference / 5 hypothesis tokens
        let f1 = rouge_l_f1("the cat sat on the mat", "the cat lay on mat");
        let (p, r) = (4.0 / 5.0, 4.0 / 6.0);
        assert!((f1 - 2.0 * p * r / (p + r)).abs() < 1e-12);
    }

    #[test]
    fn test_lcs_length() {
        let a: Vec<String> = "a b c d".split(' ').map(String::from).collect();
        let b: Vec<String> = "a c x d".split(' ').map(String::from).collect();
        assert_eq!(lcs_length(&a, &b), 3);
        assert_eq!(lcs_length(&a, &[]), 0);
    }

    #[test]
    fn test_tokenize_13a() {
        assert_eq!(
            tokenize_13a("Hello, world! It costs 3.50 (or 1,000)."),
            vec!["Hello", ",", "world", "!", "It", "costs", "3.50", "(", "or", "1,000", ")", "."]
        );
        assert_eq!(tokenize_13a("well-known 5-6"), vec!["well-known", "5", "-", "6"]);
    }

    #[test]
    fn test_bleu_identical_is_100() {
        let text = "the quick brown fox jumps over the lazy dog";
        assert!((sentence_bleu(text, text) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_bleu_too_short_is_zero() {
        assert_eq!(sentence_bleu("hello", "hello"), 0.0);
        assert_eq!(sentence_bleu("", ""), 0.0);
    }

    #[test]
    fn test_bleu_partial_overlap() {
        let score = sentence_bleu(
            "the quick brown fox jumps over the dog",
            "the quick brown fox jumps over the lazy dog",
        );
        assert!(score > 0.0 && score < 100.0);
    }

    #[test]
    fn test_bleu_without_any_match_is_zero() {
        assert_eq!(
            sentence_bleu("alpha beta gamma delta epsilon", "one two three four five"),
            0.0
        );
        let corpus = corpus_bleu(
            &["alpha beta gamma delta", "red green blue yellow"],
            &["one two three four", "five six seven eight"],
        );
        assert_eq!(corpus, 0.0);
    }

    #[test]
    fn test_bleu_smoothing_keeps_score_positive() {
        // unigram hits but no higher-order hits
        let score = sentence_bleu("dog lazy the over", "the lazy dog over");
        assert!(score > 0.0);
    }

    #[test]
    fn test_corpus_bleu_pools_counts() {
        let hyps = ["the quick brown fox jumps", "a completely different sentence here"];
        let refs = ["the quick brown fox jumps", "the quick brown fox jumps"];
        let corpus = corpus_bleu(&hyps, &refs);
        assert!(corpus > 0.0 && corpus < 100.0);
    }

    proptest! {
        #[test]
        fn prop_bigram_jaccard_symmetric(a in "[a-c ]{0,24}", b in "[a-c ]{0,24}") {
            prop_assert_eq!(bigram_jaccard(&a, &b), bigram_jaccard(&b, &a));
            let v = bigram_jaccard(&a, &b);
            prop_assert!((0.0..=1.0).contains(&v));
        }

        #[test]
        fn prop_bigram_jaccard_self_is_one(a in "[a-z]{1,5}( [a-z]{1,5}){0,6}") {
            prop_assert_eq!(bigram_jaccard(&a, &a), 1.0);
        }

        #[test]
        fn prop_style_similarity_symmetric_in_unit_range(a in "[a-d .!]{0,40}", b in "[a-d .!]{0,40}") {
            let ab = style_similarity_text(&a, &b);
            prop_assert_eq!(ab, style_similarity_text(&b, &a));
            prop_assert!(ab > 0.0 && ab <= 1.0);
            prop_assert_eq!(style_similarity_text(&a, &a), 1.0);
        }
    }
}
