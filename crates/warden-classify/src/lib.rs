//! # Warden Classify - Out-of-Band AI Classification
//!
//! Runs `ai_detect` rules, the one rule type the synchronous engine in
//! `warden-rules` cannot evaluate locally. A [`Classifier`] sends content
//! to an external model with a strict JSON answer contract; the
//! [`GeminiClassifier`] implementation talks to the Google Generative
//! Language API. [`process_ai_detect_rules`] folds the answers back into
//! the same [`MatchResult`](warden_rules::MatchResult) shape the
//! synchronous engine emits.
//!
//! This path is best-effort by construction: transport errors, empty
//! answers and malformed JSON all fail open to "no match" and are logged,
//! never propagated. Run it out-of-band (a background task over captured
//! traffic), not inline on the request path.

pub mod detect;
pub mod error;
pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use detect::{process_ai_detect_rules, MAX_CLASSIFY_CHARS};
pub use error::ClassifyError;
pub use gemini::{parse_classification, GeminiClassifier, GeminiConfig};

/// One classification answer: did the text contain the described data,
/// and which fragments. This is the JSON contract the model must honor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub matched: bool,
    #[serde(default)]
    pub snippets: Vec<String>,
}

/// A model-backed detector for free-text data descriptions.
///
/// `sensitive_description` is the rule's `pattern` field, e.g.
/// "internal project codenames" - prose, not a regex.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        sensitive_description: &str,
    ) -> Result<Classification, ClassifyError>;
}
