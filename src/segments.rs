//! Per-segment buckets of run texts and confidences.
//!
//! A conversation over N prompts has N + 1 segments: `total` (every assistant
//! reply joined by newlines) followed by `m1`..`mN`.

use crate::confidence::{average_logprob_for_message, average_logprob_for_messages};
use crate::models::ConversationResult;

pub const TOTAL_SEGMENT: &str = "total";

/// Segment labels for a conversation of `num_prompts` turns.
pub fn segment_labels(num_prompts: usize) -> Vec<String> {
    std::iter::once(TOTAL_SEGMENT.to_string())
        .chain((1..=num_prompts).map(|i| format!("m{}", i)))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct SegmentBucket {
    /// One text per absorbed run, empty when the reply was missing
    pub texts: Vec<String>,
    /// Average log-probabilities, only for runs that produced one
    pub confidences: Vec<f64>,
    /// Fixed reference text, if the caller supplied one
    pub anchor: Option<String>,
}

/// Accumulates run outputs by segment, in label order.
#[derive(Debug, Clone)]
pub struct SegmentBuckets {
    labels: Vec<String>,
    buckets: Vec<SegmentBucket>,
}

impl SegmentBuckets {
    /// Buckets for `num_prompts` turns. `reference`, when given, must hold one
    /// text per prompt; the `total` anchor is their newline join.
    pub fn new(num_prompts: usize, reference: Option<&[String]>) -> Self {
        let labels = segment_labels(num_prompts);
        let mut buckets = vec![SegmentBucket::default(); labels.len()];

        if let Some(reference) = reference {
            buckets[0].anchor = Some(reference.join("\n"));
            for (bucket, text) in buckets[1..].iter_mut().zip(reference) {
                bucket.anchor = Some(text.clone());
            }
        }

        Self { labels, buckets }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Iterate `(label, bucket)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SegmentBucket)> {
        self.labels.iter().map(String::as_str).zip(&self.buckets)
    }

    pub fn has_confidence(&self) -> bool {
        self.buckets.iter().any(|b| !b.confidences.is_empty())
    }

    /// Fold one run into the buckets. A short conversation pads the missing
    /// turns with empty text.
    pub fn absorb(&mut self, run: &ConversationResult, capture_confidence: bool) {
        let messages = &run.assistant_messages;
        let total_text = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.buckets[0].texts.push(total_text);

        for (i, bucket) in self.buckets[1..].iter_mut().enumerate() {
            let text = messages.get(i).map(|m| m.content.clone()).unwrap_or_default();
            bucket.texts.push(text);
        }

        if !capture_confidence {
            return;
        }

        if let Some(lp) = average_logprob_for_messages(messages) {
            self.buckets[0].confidences.push(lp);
        }
        for (i, bucket) in self.buckets[1..].iter_mut().enumerate() {
            if let Some(lp) = messages.get(i).and_then(average_logprob_for_message) {
                bucket.confidences.push(lp);
            }
        }
    }
}
