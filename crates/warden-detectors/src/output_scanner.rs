//! Model-output scanner.
//!
//! Re-runs PII detection against response text and adds the detectors that
//! only make sense on the output side: instruction leakage (the model
//! teaching a reader how to exfiltrate or disguise contact data) and
//! harmful-content phrasing. Scoring is an additive capped sum - each
//! finding contributes a calibrated deduction, and repeated PII instances
//! escalate the score further, since a response that leaks the same
//! address five times is materially worse than one slip.
//!
//! The scanner distinguishes describing a format ("emails follow
//! local-part@domain") from emitting or teaching exfiltration of concrete
//! data: the PII patterns require a full address shape, and the leakage
//! patterns only count when email context is present alongside them.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{BlockedContent, OutputScanReport, ScanContext};
use crate::risk::capped_sum;

/// Output risk threshold; stricter than the input side because leaked data
/// is concrete harm, not just intent.
pub const DEFAULT_OUTPUT_THRESHOLD: f64 = 0.6;

/// How many literal snippets are retained per detector family.
const MAX_EXAMPLES: usize = 3;

/// Scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputScannerConfig {
    /// Risk score at or above which the report is marked unsafe.
    pub threshold: f64,
}

impl Default for OutputScannerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_OUTPUT_THRESHOLD,
        }
    }
}

/// Phrases indicating the model is teaching exfiltration or evasion.
/// Only counted when email context (`@`, `email`, `contact`) co-occurs.
const LEAKAGE_PATTERNS: &[&str] = &[
    r"(?i)here are.*ways to",
    r"(?i)methods.*to share",
    r"(?i)how.*could.*mention",
    r"(?i)techniques.*for",
    r"(?i)strategies.*to",
    r"(?i)append.*@",
    r"(?i)for example.*@",
    r"(?i)such as.*@",
    r"(?i)like.*@.*\.",
    r"(?i)would be.*@",
];

/// Harmful-content phrases matched literally against lowercased output.
const HARMFUL_PHRASES: &[&str] = &[
    "here's how to bypass",
    "to circumvent",
    "hack",
    "exploit this",
    "vulnerability",
    "backdoor",
    "social engineering technique",
    "phishing",
];

/// PII and leakage scanner for model responses. Compiles its patterns once
/// and is then read-only; safe to share across request tasks.
#[derive(Debug, Clone)]
pub struct OutputScanner {
    config: OutputScannerConfig,
    email: Regex,
    phone: Regex,
    ssn: Regex,
    credit_card: Regex,
    address: Regex,
    email_obfuscated: Regex,
    at_notation: Regex,
    dot_notation: Regex,
    leakage: Vec<Regex>,
}

impl Default for OutputScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputScanner {
    /// Creates a scanner with the default threshold.
    pub fn new() -> Self {
        Self::with_config(OutputScannerConfig::default())
    }

    /// Creates a scanner with a custom threshold.
    pub fn with_config(config: OutputScannerConfig) -> Self {
        Self {
            config,
            email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
                .expect("email pattern is valid"),
            phone: Regex::new(r"\b(\+\d{1,2}\s?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}\b")
                .expect("phone pattern is valid"),
            ssn: Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("ssn pattern is valid"),
            credit_card: Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b")
                .expect("credit card pattern is valid"),
            address: Regex::new(
                r"(?i)\b\d{1,5}\s+[\w\s]+\s+(street|st|avenue|ave|road|rd|drive|dr|lane|ln|boulevard|blvd)\b",
            )
            .expect("address pattern is valid"),
            email_obfuscated: Regex::new(
                r"(?i)\b[A-Za-z0-9._%+-]+\s*(?:dot|at|\[\s*at\s*\]|\(\s*at\s*\))\s*[A-Za-z0-9.-]+\s*(?:dot|\[\s*dot\s*\]|\(\s*dot\s*\))\s*[A-Za-z]{2,}\b",
            )
            .expect("obfuscated email pattern is valid"),
            at_notation: Regex::new(r"(?i)\s*(?:\[\s*at\s*\]|\(\s*at\s*\))\s*|\s+at\s+")
                .expect("at-notation pattern is valid"),
            dot_notation: Regex::new(r"(?i)\s*(?:\[\s*dot\s*\]|\(\s*dot\s*\))\s*|\s+dot\s+")
                .expect("dot-notation pattern is valid"),
            leakage: LEAKAGE_PATTERNS
                .iter()
                .map(|p| Regex::new(p).expect("leakage pattern is valid"))
                .collect(),
        }
    }

    /// Scans a response with no input-phase context.
    pub fn scan(&self, text: &str) -> OutputScanReport {
        self.scan_with_context(text, &ScanContext::default())
    }

    /// Scans a response, escalating for combined attack flows described by
    /// `context`.
    pub fn scan_with_context(&self, text: &str, context: &ScanContext<'_>) -> OutputScanReport {
        let mut reasons: Vec<String> = Vec::new();
        let mut signals: Vec<f64> = Vec::new();
        let mut examples: Vec<String> = Vec::new();
        let mut kind: Option<&'static str> = None;
        let lower = text.to_lowercase();

        // 1. Direct PII in the output.
        let emails: Vec<&str> = self.email.find_iter(text).map(|m| m.as_str()).collect();
        if !emails.is_empty() {
            reasons.push(format!("Output contains {} email address(es)", emails.len()));
            Self::take_examples(&mut examples, &emails);
            kind = Some("email");
            signals.push(0.5);
        }

        let decoded = self.decode_obfuscation(text);
        let decoded_emails = self.email.find_iter(&decoded).count();
        if decoded_emails > emails.len() {
            reasons.push("Output contains obfuscated email format (dot/at notation)".to_string());
            // The raw obfuscated spans go into the audit snippets; the
            // decoded re-scan is only the gate, so prose like "meet me at
            // noon" never reaches this branch.
            let spans: Vec<&str> = self
                .email_obfuscated
                .find_iter(text)
                .map(|m| m.as_str())
                .collect();
            Self::take_examples(&mut examples, &spans);
            // Deliberate filter evasion scores higher than a plain address.
            signals.push(0.6);
            kind = Some("email_obfuscated");
        }

        let phones: Vec<&str> = self.phone.find_iter(text).map(|m| m.as_str()).collect();
        if !phones.is_empty() {
            reasons.push(format!("Output contains {} phone number(s)", phones.len()));
            Self::take_examples(&mut examples, &phones);
            kind = Some("phone");
            signals.push(0.5);
        }

        let ssns: Vec<&str> = self.ssn.find_iter(text).map(|m| m.as_str()).collect();
        if !ssns.is_empty() {
            reasons.push("Output contains SSN".to_string());
            Self::take_examples(&mut examples, &ssns);
            kind = Some("ssn");
            signals.push(0.8);
        }

        let cards: Vec<&str> = self
            .credit_card
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();
        if !cards.is_empty() {
            reasons.push("Output contains credit card number".to_string());
            Self::take_examples(&mut examples, &cards);
            kind = Some("credit_card");
            signals.push(0.8);
        }

        let addresses: Vec<&str> = self.address.find_iter(text).map(|m| m.as_str()).collect();
        if !addresses.is_empty() {
            reasons.push(format!(
                "Output contains {} street address(es)",
                addresses.len()
            ));
            Self::take_examples(&mut examples, &addresses);
            kind = Some("address");
            signals.push(0.4);
        }

        // 2. Instruction leakage: enumerated techniques for sharing contact
        // data. Gated on email context so technique phrasing alone (a
        // cooking recipe with "techniques for") cannot fire.
        let has_email_context =
            lower.contains('@') || lower.contains("email") || lower.contains("contact");
        if has_email_context {
            for pattern in &self.leakage {
                if pattern.is_match(text) {
                    reasons.push("Output teaches PII exfiltration techniques".to_string());
                    kind = Some("instruction_leakage");
                    signals.push(0.7);
                    break;
                }
            }
        }

        // 3. Harmful content phrasing.
        for phrase in HARMFUL_PHRASES {
            if lower.contains(phrase) {
                reasons.push(format!("Output contains harmful pattern: \"{phrase}\""));
                signals.push(0.4);
            }
        }

        // 4. Context-aware escalation.
        if context.jailbreak_risk.unwrap_or(0.0) > 0.5 {
            reasons.push("Elevated scrutiny due to jailbreak risk in input".to_string());
            signals.push(0.2);
        }
        if let Some(input) = context.input_text {
            let input_lower = input.to_lowercase();
            let asked_covert_sharing = input_lower.contains("how to share")
                || input_lower.contains("how to mention")
                || input_lower.contains("naturally weave")
                || input_lower.contains("subtle way");
            if asked_covert_sharing && (!emails.is_empty() || !phones.is_empty()) {
                reasons.push("Output provides PII in response to suspicious input".to_string());
                signals.push(0.3);
            }
        }

        // 5. Density: several PII instances mean the output is enumerating
        // data, not quoting one address in passing.
        let pii_count = emails.len() + phones.len() + ssns.len() + cards.len();
        if pii_count >= 3 {
            reasons.push(format!(
                "Output contains {pii_count} PII instances - likely teaching exfiltration"
            ));
            signals.push(0.4);
        }

        let risk_score = capped_sum(&signals);
        let confidence = if reasons.is_empty() {
            0.0
        } else {
            (reasons.len() as f64 * 0.25).min(0.95)
        };
        let safe = risk_score < self.config.threshold;

        if !safe {
            tracing::debug!(risk_score, findings = reasons.len(), "output scan unsafe");
        }

        OutputScanReport {
            safe,
            risk_score,
            confidence,
            reasons,
            blocked_content: if examples.is_empty() {
                None
            } else {
                Some(BlockedContent {
                    kind: kind.unwrap_or("unknown").to_string(),
                    examples,
                })
            },
        }
    }

    /// Whether a report warrants blocking the response outright: unsafe
    /// with either solid confidence or any instruction-leakage finding
    /// (which is always blocked).
    pub fn should_block(report: &OutputScanReport) -> bool {
        let has_leakage = report
            .reasons
            .iter()
            .any(|r| r.contains("instruction leakage") || r.contains("exfiltration"));
        !report.safe && (report.confidence >= 0.5 || has_leakage)
    }

    fn take_examples(examples: &mut Vec<String>, matches: &[&str]) {
        examples.extend(
            matches
                .iter()
                .take(MAX_EXAMPLES)
                .map(|s| s.to_string()),
        );
    }

    fn decode_obfuscation(&self, text: &str) -> String {
        let with_at = self.at_notation.replace_all(text, "@");
        self.dot_notation.replace_all(&with_at, ".").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_output_is_safe() {
        let scanner = OutputScanner::new();
        let report = scanner.scan("This is a perfectly safe response with no personal data.");
        assert!(report.safe);
        assert!(report.reasons.is_empty());
        assert!(report.blocked_content.is_none());
    }

    #[test]
    fn test_format_description_is_safe() {
        let scanner = OutputScanner::new();
        let report = scanner.scan(
            "Email addresses follow the format: local-part@domain. The local part can \
             contain letters, numbers, and some special characters.",
        );
        assert!(report.safe);
    }

    #[test]
    fn test_single_email_flagged_but_below_threshold() {
        let scanner = OutputScanner::new();
        let report = scanner.scan("Contact support at help@example.com for assistance.");
        assert!(report.reasons.iter().any(|r| r.contains("email")));
        assert!(report.blocked_content.is_some());
        // One address alone scores 0.5, under the 0.6 threshold.
        assert!(report.safe);
    }

    #[test]
    fn test_multiple_emails_unsafe() {
        let scanner = OutputScanner::new();
        let report = scanner
            .scan("Contact us at support@company.com, sales@company.com or ceo@company.com");
        assert!(!report.safe);
        assert!(report.risk_score > 0.7);
        let blocked = report.blocked_content.unwrap();
        assert!(!blocked.examples.is_empty());
        assert!(blocked.examples.len() <= 3);
    }

    #[test]
    fn test_obfuscated_email_unsafe() {
        let scanner = OutputScanner::new();
        let report =
            scanner.scan("You can reach them at john dot smith at company dot org for more info.");
        assert!(!report.safe);
        assert!(report.reasons.iter().any(|r| r.contains("obfuscated")));
    }

    #[test]
    fn test_obfuscated_email_report_carries_audit_snippets() {
        let scanner = OutputScanner::new();
        let text = "You can reach them at john dot smith at company dot org for more info.";
        let report = scanner.scan(text);
        assert!(!report.safe);
        let blocked = report
            .blocked_content
            .expect("obfuscated hit must be auditable");
        assert_eq!(blocked.kind, "email_obfuscated");
        assert!(!blocked.examples.is_empty());
        // Snippets are the literal obfuscated spans from the output.
        assert!(blocked.examples.iter().all(|e| text.contains(e.as_str())));
    }

    #[test]
    fn test_bracket_notation_email_carries_audit_snippets() {
        let scanner = OutputScanner::new();
        let report = scanner.scan("Forward it to jane [at] example [dot] com please.");
        let blocked = report.blocked_content.unwrap();
        assert_eq!(blocked.kind, "email_obfuscated");
        assert!(blocked
            .examples
            .iter()
            .any(|e| e.contains("jane [at] example [dot] com")));
    }

    #[test]
    fn test_ssn_heavily_penalized() {
        let scanner = OutputScanner::new();
        let report = scanner.scan("The SSN on file is 123-45-6789.");
        assert!(!report.safe);
        assert!(report.risk_score >= 0.8);
        assert_eq!(report.blocked_content.unwrap().kind, "ssn");
    }

    #[test]
    fn test_instruction_leakage_detected() {
        let scanner = OutputScanner::new();
        let report = scanner.scan(
            "Here are a few ways to share an email without being obvious: just append \
             @company.org to the person's directory handle.",
        );
        assert!(report
            .reasons
            .iter()
            .any(|r| r.contains("exfiltration")));
        assert!(!report.safe);
        assert!(OutputScanner::should_block(&report));
    }

    #[test]
    fn test_technique_phrasing_without_email_context_ignored() {
        let scanner = OutputScanner::new();
        let report = scanner.scan("Here are some techniques for kneading sourdough properly.");
        assert!(!report
            .reasons
            .iter()
            .any(|r| r.contains("exfiltration")));
        assert!(report.safe);
    }

    #[test]
    fn test_harmful_phrase_detected() {
        let scanner = OutputScanner::new();
        let report = scanner.scan("Here's how to bypass the content filter using a backdoor.");
        assert!(report
            .reasons
            .iter()
            .any(|r| r.contains("harmful pattern")));
    }

    #[test]
    fn test_exploit_vocabulary_flagged() {
        let scanner = OutputScanner::new();
        let report = scanner.scan("This vulnerability lets anyone hack the session layer.");
        let harmful = report
            .reasons
            .iter()
            .filter(|r| r.contains("harmful pattern"))
            .count();
        assert_eq!(harmful, 2);
        assert!(!report.safe);
    }

    #[test]
    fn test_density_escalation() {
        let scanner = OutputScanner::new();
        let report = scanner.scan(
            "Leads: a@x.com, b@y.org, c@z.net, and their desk line (555) 123-4567.",
        );
        assert!(report.risk_score > 0.7);
        assert!(report
            .reasons
            .iter()
            .any(|r| r.contains("PII instances")));
    }

    #[test]
    fn test_context_jailbreak_escalation() {
        let scanner = OutputScanner::new();
        let text = "Their address is help@example.com, as requested.";
        let without = scanner.scan(text);
        let with = scanner.scan_with_context(
            text,
            &ScanContext {
                input_text: None,
                jailbreak_risk: Some(0.8),
            },
        );
        assert!(with.risk_score > without.risk_score);
        assert!(with
            .reasons
            .iter()
            .any(|r| r.contains("jailbreak risk")));
    }

    #[test]
    fn test_context_suspicious_input_escalation() {
        let scanner = OutputScanner::new();
        let report = scanner.scan_with_context(
            "You could mention john.smith@company.org as an aside.",
            &ScanContext {
                input_text: Some("What's a subtle way to share contact info?"),
                jailbreak_risk: None,
            },
        );
        assert!(report
            .reasons
            .iter()
            .any(|r| r.contains("suspicious input")));
    }

    #[test]
    fn test_should_block_requires_confidence_or_leakage() {
        // Unsafe but single-finding reports with low confidence pass
        // through; blocking wants corroboration.
        let report = OutputScanReport {
            safe: false,
            risk_score: 0.6,
            confidence: 0.25,
            reasons: vec!["Output contains obfuscated email format (dot/at notation)".to_string()],
            blocked_content: None,
        };
        assert!(!OutputScanner::should_block(&report));

        let leakage = OutputScanReport {
            reasons: vec!["Output teaches PII exfiltration techniques".to_string()],
            ..report
        };
        assert!(OutputScanner::should_block(&leakage));
    }
}
