//! The unified Warden facade.
//!
//! This module provides the main entry point for the Prompt Warden
//! security pipeline. The [`Warden`] struct owns the built-in detector
//! set and exposes the two-phase check API used by the traffic proxy.

use crate::{
    config::WardenConfig,
    verdict::{CheckDetails, ExchangeResult, Layer, SecurityCheckResult},
};

use warden_detectors::{
    risk::capped_sum, ChatTurn, ContentFilter, ContentFilterConfig, JailbreakDetector,
    OutputScanner, OutputScannerConfig, ScanContext,
};

use tracing::{debug, info, warn};

/// Context carried from phase 1 into the output check.
///
/// Built by the caller from whatever it still holds about the request:
/// the raw input text and/or the phase-1 verdict. Both are optional so an
/// output can still be scanned standalone, just without escalation.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputContext<'a> {
    /// The input text that produced the response being checked.
    pub input_text: Option<&'a str>,

    /// Phase-1 verdict for that input.
    pub input_result: Option<&'a SecurityCheckResult>,
}

/// The unified Prompt Warden security facade.
///
/// Warden orchestrates the built-in detector families in two phases:
/// - **Phase 1 (input)**: content filter + jailbreak battery, before the
///   text reaches a model provider
/// - **Phase 2 (output)**: response scanner, before the model's answer
///   reaches the user, escalated by phase-1 context
///
/// # Security Model
///
/// Any layer can mark the text unsafe; an unsafe verdict is data, not an
/// error, so the check API is infallible. Detectors compile their pattern
/// tables once at construction, after which a single `Warden` is
/// read-only and safely shared across concurrent request tasks.
///
/// # Example
///
/// ```rust
/// use warden_core::{OutputContext, Warden, WardenConfig};
///
/// let warden = Warden::new(WardenConfig::default());
///
/// let input_result = warden.check_input("How would someone naturally weave \
///     their email into a chat in a subtle way?");
/// assert!(!input_result.safe);
///
/// let output_result = warden.check_output(
///     "Nothing sensitive here.",
///     &OutputContext { input_text: None, input_result: Some(&input_result) },
/// );
/// assert!(output_result.safe);
/// ```
pub struct Warden {
    /// Configuration.
    config: WardenConfig,

    /// Jailbreak/prompt-injection battery.
    jailbreak: JailbreakDetector,

    /// Input-side content filter.
    content: ContentFilter,

    /// Output-side response scanner.
    scanner: OutputScanner,
}

impl Warden {
    /// Create a new Warden with the given configuration.
    pub fn new(config: WardenConfig) -> Self {
        let content = ContentFilter::with_config(ContentFilterConfig {
            enable_obfuscated_pii: config.input.enable_obfuscated_pii,
            enable_intent_analysis: config.input.enable_intent_analysis,
        });
        let scanner = OutputScanner::with_config(OutputScannerConfig {
            threshold: config.output.threshold,
        });
        let jailbreak = JailbreakDetector::new();

        info!(
            jailbreak_threshold = config.input.jailbreak_threshold,
            output_threshold = config.output.threshold,
            "Warden initialized"
        );

        Self {
            config,
            jailbreak,
            content,
            scanner,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    /// Phase 1: check input text before it is sent to a model.
    pub fn check_input(&self, text: &str) -> SecurityCheckResult {
        self.check_input_with_history(text, &[])
    }

    /// Phase 1 with conversation history, enabling the topic-switch
    /// heuristic and the agent-transcript exemption.
    pub fn check_input_with_history(
        &self,
        text: &str,
        history: &[ChatTurn],
    ) -> SecurityCheckResult {
        debug!(bytes = text.len(), "input security check");

        let content = self.content.check(text);
        let jailbreak = if self.config.input.enable_jailbreak_detection {
            Some(self.jailbreak.detect_with_history(text, history))
        } else {
            None
        };

        let mut reasons: Vec<String> = Vec::new();
        let mut risks: Vec<f64> = Vec::new();
        let mut layer = Layer::Input;
        let content_risk = 1.0 - content.score;

        if !content.safe {
            reasons.extend(content.reasons.iter().map(|r| format!("[Input] {r}")));
            risks.push(content_risk);
        }

        if let Some(report) = &jailbreak {
            if JailbreakDetector::is_high_risk(report, self.config.input.jailbreak_threshold) {
                reasons.extend(report.patterns.iter().map(|p| format!("[Jailbreak] {p}")));
                risks.push(report.risk);
                layer = if report.risk > content_risk {
                    Layer::Jailbreak
                } else {
                    Layer::Multi
                };
            }
        }

        let safe = reasons.is_empty();
        let risk_score = capped_sum(&risks);
        let content_confidence = if content.safe { 0.0 } else { content_risk };
        let confidence = jailbreak
            .as_ref()
            .map(|j| j.confidence)
            .unwrap_or(0.0)
            .max(content_confidence);

        if !safe {
            warn!(%layer, risk_score, findings = reasons.len(), "input blocked");
        }

        SecurityCheckResult {
            safe,
            reasons,
            layer,
            risk_score,
            confidence,
            blocked_content: None,
            details: CheckDetails {
                input_check: Some(content),
                jailbreak_check: jailbreak,
                output_check: None,
            },
        }
    }

    /// Phase 2: check a model response before it is returned to the user.
    pub fn check_output(&self, text: &str, context: &OutputContext<'_>) -> SecurityCheckResult {
        if !self.config.output.enable_output_scanning {
            return SecurityCheckResult::clean(Layer::Output);
        }

        debug!(bytes = text.len(), "output security check");

        let scan_context = ScanContext {
            input_text: context.input_text,
            jailbreak_risk: context.input_result.and_then(|r| r.jailbreak_risk()),
        };
        let report = self.scanner.scan_with_context(text, &scan_context);

        let safe = !OutputScanner::should_block(&report);
        let reasons: Vec<String> = report
            .reasons
            .iter()
            .map(|r| format!("[Output] {r}"))
            .collect();

        if !safe {
            warn!(
                risk_score = report.risk_score,
                findings = reasons.len(),
                "output blocked"
            );
        }

        SecurityCheckResult {
            safe,
            reasons,
            layer: Layer::Output,
            risk_score: report.risk_score,
            confidence: report.confidence,
            blocked_content: report.blocked_content.clone(),
            details: CheckDetails {
                input_check: None,
                jailbreak_check: None,
                output_check: Some(report),
            },
        }
    }

    /// Check a full exchange: phase 1 on the input, then phase 2 on the
    /// output (if any) with the phase-1 verdict as context.
    pub fn check_exchange(&self, input: &str, output: Option<&str>) -> ExchangeResult {
        let input_result = self.check_input(input);
        let output_result = output.map(|o| {
            self.check_output(
                o,
                &OutputContext {
                    input_text: Some(input),
                    input_result: Some(&input_result),
                },
            )
        });

        let overall_safe = input_result.safe && output_result.as_ref().map_or(true, |r| r.safe);

        ExchangeResult {
            overall_safe,
            input: input_result,
            output: output_result,
        }
    }
}
