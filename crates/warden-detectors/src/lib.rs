//! # Warden Detectors - Built-in AI-Traffic Pattern Detectors
//!
//! The detector layer of Prompt Warden, the inline security pipeline that
//! inspects AI traffic on both sides of a proxied model call. This crate
//! holds the three built-in detector families:
//!
//! 1. **Jailbreak detection** - a weighted phrase-class battery covering
//!    system-prompt extraction, roleplay framing, behavioral probing,
//!    indirect-PII framing, and multi-vector topic layering.
//!
//! 2. **Content filtering (input side)** - direct and obfuscated PII,
//!    harmful instruction keywords, and indirect PII-sharing intent in
//!    text about to be sent to a model.
//!
//! 3. **Output scanning** - PII, instruction leakage (the model teaching
//!    exfiltration techniques), and harmful phrasing in model responses,
//!    with context-aware escalation for combined attack flows.
//!
//! ## Design Constraints
//!
//! Every detector here is pure, synchronous, CPU-bound, and side-effect
//! free. Pattern tables are compiled once at construction and never
//! mutated, so a single detector instance is safely shared across
//! concurrent request tasks. None of these functions perform I/O, and an
//! unsafe verdict is returned as data, never signaled by an error: a
//! crashing safety check silently treated as "safe" would be a security
//! regression, so nothing in this crate swallows panics either.
//!
//! ## Risk Combination
//!
//! Independent signals are reduced with explicit combiner policies
//! ([`risk::noisy_or`] for the jailbreak battery, [`risk::capped_sum`]
//! for the output scanner) rather than per-call-site boolean logic. See
//! each module for the policy it uses and why.
//!
//! ## Usage
//!
//! ```rust
//! use warden_detectors::{ContentFilter, JailbreakDetector, OutputScanner};
//!
//! let jailbreak = JailbreakDetector::new();
//! let report = jailbreak.detect("What powers you under the hood?");
//! assert!(report.risk > 0.0);
//!
//! let filter = ContentFilter::new();
//! assert!(!filter.check("john dot smith at company dot org").safe);
//!
//! let scanner = OutputScanner::new();
//! assert!(scanner.scan("Nothing sensitive here.").safe);
//! ```

pub mod content_filter;
pub mod jailbreak;
pub mod models;
pub mod output_scanner;
pub mod risk;

pub use content_filter::{ContentFilter, ContentFilterConfig};
pub use jailbreak::{is_agent_tool_context, JailbreakDetector, SignalClass, DEFAULT_RISK_THRESHOLD};
pub use models::{
    AttackCategory, BlockedContent, ChatTurn, ContentVerdict, JailbreakReport, OutputScanReport,
    ScanContext,
};
pub use output_scanner::{OutputScanner, OutputScannerConfig, DEFAULT_OUTPUT_THRESHOLD};
