//! # Warden Rules - User-Configurable Data Rule Engine
//!
//! Organization-specific policy layer of Prompt Warden. Projects define
//! [`CustomDataRule`]s - keyword lists, regexes, JSON paths, or free-text
//! classifier descriptions - each carrying an action (mask, redact or
//! block) and a priority. The engine evaluates a borrowed snapshot of
//! rules against one piece of content and returns the transformed text
//! plus a full audit trail of what matched.
//!
//! ## Guarantees
//!
//! - **Deterministic**: priority descending, ties in snapshot order;
//!   identical `(text, rules)` input always produces byte-identical
//!   output.
//! - **Fail-open per rule**: an invalid user regex is logged and treated
//!   as no-match; it cannot take down the batch. The `regex` crate's
//!   linear-time engine also rules out catastrophic backtracking from
//!   user-supplied patterns.
//! - **No short-circuit**: every active rule is evaluated even after a
//!   block match; `should_block` is a veto flag for the caller, not a
//!   mid-pass abort.
//! - **Hot-path safe**: everything here is synchronous and CPU-bound.
//!   `ai_detect` rules are deliberately inert in this crate; the
//!   `warden-classify` crate runs them out-of-band.
//!
//! ## Usage
//!
//! ```rust
//! use warden_rules::{process_rules, CustomDataRule, MatchType, RuleAction};
//!
//! let rules = vec![CustomDataRule {
//!     id: "1".into(),
//!     project_id: "p".into(),
//!     name: "mask passwords".into(),
//!     description: None,
//!     match_type: MatchType::Keywords,
//!     pattern: "password".into(),
//!     case_sensitive: false,
//!     action: RuleAction::Mask,
//!     is_active: true,
//!     priority: 10,
//! }];
//!
//! let result = process_rules("my password is hunter2", &rules, None);
//! assert!(result.was_processed);
//! assert!(!result.content.contains("password"));
//! ```

pub mod actions;
pub mod engine;
pub mod matchers;
pub mod rule;

pub use actions::{apply_mask, apply_redact, REDACTED_TOKEN};
pub use engine::process_rules;
pub use matchers::{match_json_path, match_keywords, match_regex};
pub use rule::{CustomDataRule, MatchResult, MatchType, ProcessedContent, RuleAction, RuleMatch};
