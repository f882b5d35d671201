use crate::text::{split_sentences, tokenize};
use crate::toolkit::ReadabilityScorer;

/// Flesch Reading Ease and Flesch-Kincaid grade with a vowel-group
/// syllable estimate.
pub struct FleschReadability;

impl ReadabilityScorer for FleschReadability {
    fn score(&self, text: &str) -> Option<(f64, f64)> {
        let words: Vec<&str> = tokenize(text)
            .into_iter()
            .filter(|w| w.chars().any(char::is_alphanumeric))
            .collect();
        if words.is_empty() {
            return None;
        }

        let sentences = split_sentences(text).len().max(1) as f64;
        let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

        let words_per_sentence = words.len() as f64 / sentences;
        let syllables_per_word = syllables as f64 / words.len() as f64;

        let reading_ease = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
        let grade = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;

        Some((round2(reading_ease), round2(grade)))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Vowel groups, minus a silent trailing `e`, at least one per word.
fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if letters.is_empty() {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut groups = 0;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            groups += 1;
        }
        previous_vowel = vowel;
    }

    let n = letters.len();
    let silent_e = n > 2 && letters[n - 1] == 'e' && !(letters[n - 2] == 'l' && !is_vowel(letters[n - 3]));
    if silent_e && groups > 1 {
        groups -= 1;
    }

    groups.max(1)
}
