use crate::models::AssistantMessage;
use crate::stats;

/// Mean token log-probability of one message, `None` without captured tokens.
pub fn average_logprob_for_message(message: &AssistantMessage) -> Option<f64> {
    let values: Vec<f64> = message.token_logprobs.iter().map(|t| t.logprob).collect();
    stats::mean(&values)
}

/// Mean token log-probability pooled over every token of every message.
pub fn average_logprob_for_messages(messages: &[AssistantMessage]) -> Option<f64> {
    let values: Vec<f64> = messages
        .iter()
        .flat_map(|m| m.token_logprobs.iter().map(|t| t.logprob))
        .collect();
    stats::mean(&values)
}
