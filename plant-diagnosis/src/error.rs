use std::time::Duration;

use thiserror::Error;

use crate::source::SourceKind;

/// Errors produced while gathering or reconciling a diagnosis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagnosisError {
    #[error("{kind} unavailable: {message}")]
    SourceUnavailable { kind: SourceKind, message: String },

    #[error("{kind} timed out after {}s", .after.as_secs())]
    Timeout { kind: SourceKind, after: Duration },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),
}

impl DiagnosisError {
    pub fn unavailable(kind: SourceKind, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            kind,
            message: message.into(),
        }
    }

    /// Malformed input never succeeds on retry; every upstream failure might.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MalformedInput(_))
    }
}

pub type Result<T> = std::result::Result<T, DiagnosisError>;
