//! Error types of the completion pipeline.
//!
//! None of these reach the end user: a failed request shows up as "no extra
//! suggestions", a failed import as "text inserted, using not added".

use isx_common::Cancelled;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request was cancelled")]
    Cancelled,
    #[error("malformed program state: {0}")]
    MalformedProgramState(String),
}

impl From<Cancelled> for CompletionError {
    fn from(_: Cancelled) -> Self {
        CompletionError::Cancelled
    }
}

/// Failure of the import insertion collaborator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("no import inserter is available")]
    Unavailable,
    #[error("import of `{namespace}` was rejected: {reason}")]
    Rejected { namespace: String, reason: String },
    #[error("import inserter panicked: {0}")]
    Panicked(String),
}
