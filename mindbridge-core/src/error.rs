use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the assessment library.
#[derive(Debug, Error)]
pub enum MindBridgeError {
    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Session {index} not found for patient {ic_number}")]
    SessionNotFound { ic_number: String, index: usize },
}

/// Failures of the remote sentiment classifier.
///
/// These never reach callers of the analyzer: they are logged and replaced by
/// the lexicon fallback.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier did not answer within {0:?}")]
    Timeout(Duration),

    #[error("classifier request failed: {0}")]
    Request(String),

    #[error("no JSON object found in classifier response")]
    MissingJson,

    #[error("malformed classifier JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MindBridgeError>;
