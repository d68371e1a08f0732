//! Error types for the classification path.
//!
//! These errors never escape `process_ai_detect_rules` - the `ai_detect`
//! path is best-effort and fails open to "no match" (availability over
//! completeness for this one rule type). They exist so individual
//! classifier implementations can report precisely what went wrong to the
//! log line that records the fail-open.

use thiserror::Error;

/// Errors from one classification attempt.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The HTTP call to the classification provider failed.
    #[error("classification request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered, but with no usable text content.
    #[error("classifier returned an empty response")]
    EmptyResponse,

    /// The response text did not contain the required JSON object.
    #[error("classifier response was not parseable as the match contract: {0}")]
    UnparseableResponse(String),
}
