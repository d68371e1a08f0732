//! Report types shared by the built-in detectors.
//!
//! Every detector returns a structured verdict rather than an error: an
//! unsafe result is ordinary data that the caller turns into a rejected
//! request. All types derive Serde so verdicts can be attached to audit
//! records as-is.

use serde::{Deserialize, Serialize};

/// Attack class detected by the jailbreak detector.
///
/// Each variant corresponds to one pattern family in the battery. When
/// several families fire at once the detector reports the last (most
/// specific) one and lets the combined risk score carry the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackCategory {
    /// Malicious requests framed as fiction, roleplay or hypotheticals.
    SocialEngineering,
    /// Attempts to extract the system prompt or underlying model identity.
    SystemExtraction,
    /// Probing whether the assistant will push back on or bend its rules.
    BehavioralProbe,
    /// Asking the model to embed contact data into prose covertly.
    IndirectPii,
    /// Topic-switching and "quick question" layering across one message.
    MultiVector,
}

impl AttackCategory {
    /// The tag used inside `patterns` entries, e.g. `"system_extraction"`.
    pub fn tag(&self) -> &'static str {
        match self {
            AttackCategory::SocialEngineering => "social_engineering",
            AttackCategory::SystemExtraction => "system_extraction",
            AttackCategory::BehavioralProbe => "behavioral_probe",
            AttackCategory::IndirectPii => "indirect_pii",
            AttackCategory::MultiVector => "multi_vector",
        }
    }
}

/// Result of running the jailbreak battery against one text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JailbreakReport {
    /// Combined risk in `[0.0, 1.0]`; callers treat `> 0.6` as high risk.
    pub risk: f64,
    /// One entry per matched signal, formatted `category: "phrase"`.
    pub patterns: Vec<String>,
    /// Grows with the number of independent matches, capped at 0.95.
    pub confidence: f64,
    /// Most specific attack class seen, if any signal fired.
    pub category: Option<AttackCategory>,
}

impl JailbreakReport {
    /// A report with no findings.
    pub fn clean() -> Self {
        Self {
            risk: 0.0,
            patterns: Vec::new(),
            confidence: 0.0,
            category: None,
        }
    }
}

/// Verdict from the input-side content filter.
///
/// `safe` is false whenever any finding was recorded; the numeric `score`
/// (1.0 = pristine, deductions per finding) exists only so the composite
/// input check can fold content findings into its risk score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentVerdict {
    pub safe: bool,
    pub score: f64,
    pub reasons: Vec<String>,
}

impl ContentVerdict {
    pub fn clean() -> Self {
        Self {
            safe: true,
            score: 1.0,
            reasons: Vec::new(),
        }
    }
}

/// Literal matched snippets retained for audit and downstream redaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedContent {
    /// Detector family that produced the examples, e.g. `"email"`.
    pub kind: String,
    /// Up to three literal snippets per firing detector family.
    pub examples: Vec<String>,
}

/// Result of scanning a model response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputScanReport {
    /// False once the additive risk score reaches the output threshold.
    pub safe: bool,
    /// Additive risk, capped at 1.0.
    pub risk_score: f64,
    /// Scales with the number of independent findings, capped at 0.95.
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub blocked_content: Option<BlockedContent>,
}

/// Context carried from the input phase into the output scan.
///
/// Lets the scanner escalate combined attack flows: a prompt that nearly
/// tripped the input gate plus a response that leaks PII is worse than
/// either half judged alone.
#[derive(Debug, Clone, Default)]
pub struct ScanContext<'a> {
    /// The original prompt the response answers.
    pub input_text: Option<&'a str>,
    /// Jailbreak risk measured on that prompt.
    pub jailbreak_risk: Option<f64>,
}

/// One turn of conversation history supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}
