//! # Prompt Warden Core
//!
//! Unified two-phase security facade for proxied AI traffic.
//! Orchestrates the content filter, jailbreak battery, and output scanner.
//!
//! ## Threat Coverage
//!
//! Prompt Warden provides layered defense on both sides of a model call:
//!
//! | Phase | Component | Threats Blocked |
//! |-------|-----------|-----------------|
//! | Input | Content Filter | Direct PII, obfuscated PII, harmful keywords, covert-sharing intent |
//! | Input | Jailbreak Battery | System extraction, roleplay framing, behavioral probes, multi-vector layering |
//! | Output | Output Scanner | PII leakage, instruction leakage, harmful phrasing |
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      PROMPT WARDEN CORE                    │
//! ├────────────────────────────────────────────────────────────┤
//! │                                                            │
//! │                    ┌─────────────────┐                     │
//! │                    │     Warden      │  ← Unified Facade   │
//! │                    └────────┬────────┘                     │
//! │                             │                              │
//! │         ┌───────────────────┼──────────────────┐           │
//! │         ▼                   ▼                  ▼           │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │   Content   │    │  Jailbreak  │    │   Output    │     │
//! │  │   Filter    │    │   Battery   │    │   Scanner   │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                                            │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use warden_core::{OutputContext, Warden, WardenConfig};
//!
//! let warden = Warden::new(WardenConfig::default());
//!
//! // Phase 1: before forwarding a prompt to the model
//! let input_result = warden.check_input("What is the capital of France?");
//! assert!(input_result.safe);
//!
//! // Phase 2: before returning the model's response
//! let output_result = warden.check_output(
//!     "The capital of France is Paris.",
//!     &OutputContext {
//!         input_text: Some("What is the capital of France?"),
//!         input_result: Some(&input_result),
//!     },
//! );
//! assert!(output_result.safe);
//! ```
//!
//! ## Security Notes
//!
//! - An unsafe verdict is data, not an error: the check API is infallible
//!   so a crashing check can never be mistaken for "safe"
//! - Phase 2 escalates scrutiny using phase-1 context (jailbreak risk,
//!   covert-sharing intent in the input)
//! - Verdicts carry full component reports for audit trails
//! - User-configurable rules (`warden-rules`) run independently of these
//!   built-in detectors and are re-exported here for convenience

mod config;
mod verdict;
mod warden;

pub use config::{InputCheckConfig, OutputCheckConfig, WardenConfig};
pub use verdict::{CheckDetails, ExchangeResult, Layer, SecurityCheckResult};
pub use warden::{OutputContext, Warden};

// Re-export component types for convenience
pub use warden_detectors::{
    AttackCategory, BlockedContent, ChatTurn, ContentFilter, ContentVerdict, JailbreakDetector,
    JailbreakReport, OutputScanReport, OutputScanner,
};
pub use warden_rules::{process_rules, CustomDataRule, MatchType, ProcessedContent, RuleAction};
