use thiserror::Error;

/// Failures that abort a whole consistency invocation.
///
/// Metric-level problems never show up here; they degrade to a
/// "not available" cell in the result table instead.
#[derive(Error, Debug)]
pub enum ConsistencyError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown model '{0}', check the [[models]] table in the run file")]
    UnknownModel(String),

    #[error("Conversation run {run}/{total} failed")]
    Conversation {
        run: usize,
        total: usize,
        #[source]
        source: anyhow::Error,
    },
}
