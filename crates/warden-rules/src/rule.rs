//! Rule model and engine result types.
//!
//! Rules are owned by the persistence layer; this crate only ever borrows
//! a snapshot per invocation and never mutates or stores them. The serde
//! tags on [`MatchType`] and [`RuleAction`] match the wire format of
//! stored rule rows, so a fetched JSON array deserializes directly into
//! `Vec<CustomDataRule>`.

use serde::{Deserialize, Serialize};

/// How a rule's `pattern` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Comma-separated literal keyword list.
    Keywords,
    /// A regex source string.
    Regex,
    /// Comma-separated dot paths, optionally `$.`-prefixed.
    JsonPath,
    /// Free-text sensitivity description for the external classifier.
    /// Never evaluated in the synchronous engine.
    AiDetect,
}

/// What to do with content a rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Replace each snippet with a partially-starred version.
    Mask,
    /// Replace each snippet with the literal `[REDACTED]` token.
    Redact,
    /// Veto forwarding; the content itself is left untouched.
    Block,
}

/// A user-defined sensitive-data rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomDataRule {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub match_type: MatchType,
    /// Interpreted per `match_type`; see [`MatchType`].
    pub pattern: String,
    pub case_sensitive: bool,
    pub action: RuleAction,
    pub is_active: bool,
    /// Higher priority evaluates first; ties keep snapshot order.
    pub priority: i32,
}

/// Raw matcher output before it is tied to a rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleMatch {
    pub matched: bool,
    /// For keywords/regex these are literal substrings of the scanned
    /// text; for json_path they are synthetic `path=value` strings.
    pub snippets: Vec<String>,
}

impl RuleMatch {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_snippets(snippets: Vec<String>) -> Self {
        Self {
            matched: !snippets.is_empty(),
            snippets,
        }
    }
}

/// A matched rule together with its evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: bool,
    pub snippets: Vec<String>,
    pub rule: CustomDataRule,
}

/// The result of one full rule-engine pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedContent {
    /// The (possibly mutated) content. Computed even when `should_block`
    /// so audit records can show what masking would have produced.
    pub content: String,
    /// True exactly when `matched_rules` is non-empty.
    pub was_processed: bool,
    /// Matched rules in evaluation (priority) order.
    pub matched_rules: Vec<MatchResult>,
    /// Set by any matching rule with a block action; the caller must not
    /// forward the content downstream when this is true.
    pub should_block: bool,
}
