//! Part-of-speech distribution and a small rule-based tagger.

use crate::toolkit::PosTagger;
use regex::Regex;
use std::sync::LazyLock;

static WORD_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+(?:['’]\w+)*|[^\w\s]").expect("word token pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosCategory {
    Noun,
    Verb,
    Adj,
    Adv,
    Other,
}

impl PosCategory {
    #[cfg(test)]
    pub const ALL: [PosCategory; 5] = [
        PosCategory::Noun,
        PosCategory::Verb,
        PosCategory::Adj,
        PosCategory::Adv,
        PosCategory::Other,
    ];

    /// Bucket a fine-grained tag by its first letter.
    pub fn from_tag(tag: &str) -> Self {
        match tag.chars().next() {
            Some('N') => PosCategory::Noun,
            Some('V') => PosCategory::Verb,
            Some('J') => PosCategory::Adj,
            Some('R') => PosCategory::Adv,
            _ => PosCategory::Other,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Fraction of tags falling in each coarse category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PosDistribution {
    fractions: [f64; 5],
}

impl PosDistribution {
    pub fn uniform() -> Self {
        Self { fractions: [0.2; 5] }
    }

    /// All-zero for an empty tag list.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        let mut counts = [0usize; 5];
        for tag in tags {
            counts[PosCategory::from_tag(tag.as_ref()).index()] += 1;
        }

        let total: usize = counts.iter().sum();
        let mut fractions = [0.0; 5];
        if total > 0 {
            for (fraction, count) in fractions.iter_mut().zip(counts) {
                *fraction = count as f64 / total as f64;
            }
        }
        Self { fractions }
    }

    #[cfg(test)]
    pub fn get(&self, category: PosCategory) -> f64 {
        self.fractions[category.index()]
    }

    /// Cosine similarity, 0.0 when either side is all zero.
    pub fn cosine(&self, other: &PosDistribution) -> f64 {
        let dot: f64 = self.fractions.iter().zip(&other.fractions).map(|(a, b)| a * b).sum();
        let norm_a = self.fractions.iter().map(|x| x * x).sum::<f64>().sqrt();
        let norm_b = other.fractions.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

/// Closed-class word lists plus suffix and context rules.
pub struct LexiconTagger;

impl PosTagger for LexiconTagger {
    fn tag(&self, text: &str) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for token in WORD_TOKEN.find_iter(text).map(|m| m.as_str()) {
            let tag = tag_token(token, tags.last().map(String::as_str));
            tags.push(tag.to_string());
        }
        tags
    }
}

fn tag_token(token: &str, previous: Option<&str>) -> &'static str {
    if !token.chars().any(char::is_alphanumeric) {
        return match token {
            "," => ",",
            ":" | ";" => ":",
            "(" | "[" | "{" => "(",
            ")" | "]" | "}" => ")",
            _ => ".",
        };
    }
    if token.chars().all(|c| c.is_numeric() || c == '_') {
        return "CD";
    }

    let lower = token.to_lowercase();

    // Contractions: "don't" behaves like an auxiliary, "it's" like its stem
    if let Some((stem, suffix)) = lower.split_once(['\'', '’']) {
        if suffix == "t" {
            return "VB";
        }
        return closed_class(stem).unwrap_or("NN");
    }

    if let Some(tag) = closed_class(&lower) {
        return tag;
    }

    let sentence_start = matches!(previous, None | Some(".") | Some(":"));
    if !sentence_start && token.chars().next().is_some_and(char::is_uppercase) {
        return "NNP";
    }

    if matches!(previous, Some("TO") | Some("MD")) {
        return "VB";
    }

    by_suffix(&lower, previous)
}

fn by_suffix(word: &str, previous: Option<&str>) -> &'static str {
    if word.len() <= 3 {
        return "NN";
    }
    if word.ends_with("ly") {
        return "RB";
    }
    if word.ends_with("ing") {
        return "VBG";
    }
    if word.ends_with("ed") {
        return "VBD";
    }
    const ADJ: [&str; 11] = [
        "ous", "ful", "able", "ible", "ive", "less", "ish", "ical", "ary", "ic", "al",
    ];
    if ADJ.iter().any(|s| word.ends_with(s)) {
        return "JJ";
    }
    const NOUN: [&str; 12] = [
        "tion", "sion", "ment", "ness", "ity", "ship", "ism", "ance", "ence", "er", "or", "ist",
    ];
    if NOUN.iter().any(|s| word.ends_with(s)) {
        return "NN";
    }
    if ["ize", "ise", "ify", "ate"].iter().any(|s| word.ends_with(s)) {
        return "VB";
    }
    if word.ends_with('s') {
        // "she walks" vs "the walks"
        return if previous == Some("PRP") { "VBZ" } else { "NNS" };
    }
    "NN"
}

fn closed_class(word: &str) -> Option<&'static str> {
    let tag = match word {
        "the" | "a" | "an" | "this" | "that" | "these" | "those" | "each" | "every" | "some"
        | "any" | "no" | "all" | "both" | "either" | "neither" | "another" => "DT",
        "i" | "you" | "he" | "she" | "it" | "we" | "they" | "me" | "him" | "her" | "us"
        | "them" | "myself" | "yourself" | "himself" | "herself" | "itself" | "ourselves"
        | "themselves" => "PRP",
        "my" | "your" | "his" | "its" | "our" | "their" => "PRP$",
        "of" | "in" | "on" | "at" | "by" | "for" | "with" | "about" | "against" | "between"
        | "into" | "through" | "during" | "before" | "after" | "above" | "below" | "from"
        | "up" | "down" | "over" | "under" | "since" | "until" | "than" | "because"
        | "although" | "though" | "while" | "whether" | "if" | "unless" | "upon" | "within"
        | "without" | "toward" | "towards" | "across" | "along" | "among" | "around"
        | "behind" | "beyond" | "despite" | "except" | "like" | "near" | "onto" | "per"
        | "via" => "IN",
        "to" => "TO",
        "and" | "or" | "but" | "nor" | "yet" | "so" => "CC",
        "can" | "could" | "may" | "might" | "must" | "shall" | "should" | "will" | "would" => {
            "MD"
        }
        "which" => "WDT",
        "what" | "who" | "whom" | "whose" => "WP",
        "when" | "where" | "why" | "how" => "WRB",
        "there" => "EX",
        "hello" | "hi" | "oh" | "okay" | "ok" | "yes" | "please" | "thanks" => "UH",
        "is" | "am" | "are" | "was" | "were" | "be" | "been" | "being" | "have" | "has"
        | "had" | "having" | "do" | "does" | "did" | "done" | "doing" | "get" | "got"
        | "make" | "made" | "go" | "went" | "gone" | "say" | "said" | "know" | "knew"
        | "see" | "saw" | "take" | "took" | "come" | "came" | "think" | "thought" | "want"
        | "need" | "feel" | "felt" | "let" | "seem" | "help" | "hear" | "heard" | "understand"
        | "find" | "found" | "give" | "gave" | "tell" | "told" | "keep" | "kept" => "VB",
        "not" | "very" | "also" | "just" | "really" | "too" | "quite" | "now" | "then"
        | "here" | "always" | "never" | "often" | "sometimes" | "still" | "already" | "soon"
        | "again" | "only" | "even" | "ever" | "perhaps" | "maybe" | "rather" | "well"
        | "almost" | "once" | "together" | "away" | "back" => "RB",
        "good" | "great" | "new" | "old" | "important" | "different" | "small" | "large"
        | "big" | "little" | "own" | "other" | "same" | "sure" | "able" | "bad" | "best"
        | "better" | "happy" | "sad" | "right" | "possible" | "whole" | "free" | "full"
        | "certain" | "clear" | "ready" => "JJ",
        _ => return None,
    };
    Some(tag)
}
