//! Verdict types for composite security checks.

use serde::{Deserialize, Serialize};
use warden_detectors::{BlockedContent, ContentVerdict, JailbreakReport, OutputScanReport};

/// Which layer of the pipeline produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Input-side content filtering.
    Input,
    /// Output-side response scanning.
    Output,
    /// Jailbreak/prompt-injection detection.
    Jailbreak,
    /// More than one layer fired on the same text.
    Multi,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Jailbreak => "jailbreak",
            Self::Multi => "multi",
        };
        write!(f, "{name}")
    }
}

/// Component reports backing a composite verdict, kept for audit trails
/// and for feeding input context into the output check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckDetails {
    /// Content-filter verdict, present on input checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_check: Option<ContentVerdict>,

    /// Jailbreak report, present on input checks when detection is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jailbreak_check: Option<JailbreakReport>,

    /// Output-scanner report, present on output checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_check: Option<OutputScanReport>,
}

/// A composite verdict from one phase of the pipeline.
///
/// `safe == false` means the caller should not forward the text. The
/// remaining fields carry the evidence: prefixed human-readable reasons
/// (`[Input]`, `[Jailbreak]`, `[Output]`), a combined risk score, and the
/// raw component reports in `details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityCheckResult {
    /// Whether the text may be forwarded.
    pub safe: bool,

    /// Human-readable findings, prefixed with the layer that produced them.
    pub reasons: Vec<String>,

    /// Layer that determined the verdict.
    pub layer: Layer,

    /// Combined risk in [0, 1].
    pub risk_score: f64,

    /// Confidence in the verdict, in [0, 1].
    pub confidence: f64,

    /// Literal matched snippets, when a detector collected them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_content: Option<BlockedContent>,

    /// Component reports backing this verdict.
    pub details: CheckDetails,
}

impl SecurityCheckResult {
    /// A passing verdict with no findings for the given layer.
    pub fn clean(layer: Layer) -> Self {
        Self {
            safe: true,
            reasons: Vec::new(),
            layer,
            risk_score: 0.0,
            confidence: 0.0,
            blocked_content: None,
            details: CheckDetails::default(),
        }
    }

    /// Jailbreak risk recorded in this verdict's details, if any. Used to
    /// carry input context into the output check.
    pub fn jailbreak_risk(&self) -> Option<f64> {
        self.details.jailbreak_check.as_ref().map(|j| j.risk)
    }
}

/// Result of checking a full input/output exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeResult {
    /// Both phases passed (the output phase trivially, if absent).
    pub overall_safe: bool,

    /// Phase 1 verdict on the input.
    pub input: SecurityCheckResult,

    /// Phase 2 verdict on the output, when an output was provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<SecurityCheckResult>,
}
