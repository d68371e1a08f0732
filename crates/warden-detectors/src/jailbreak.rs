//! Jailbreak and prompt-injection detection.
//!
//! Runs a fixed battery of independent phrase-class signals against the
//! text: system-prompt/identity extraction, roleplay framing, behavioral
//! probing, indirect-PII request framing, and multi-vector topic layering.
//! Matched signals are combined with [`noisy_or`](crate::risk::noisy_or),
//! so co-occurring classes push the risk super-additively - layered
//! social engineering is more dangerous than any single cue.
//!
//! Legitimate agent-framework traffic (tool calls, file operations) is
//! recognized up front and exempted from the behavioral heuristics, which
//! would otherwise trip on structured tool transcripts.

use serde::{Deserialize, Serialize};

use crate::models::{AttackCategory, ChatTurn, JailbreakReport};
use crate::risk::noisy_or;

/// Default risk threshold above which callers should treat input as a
/// jailbreak attempt.
pub const DEFAULT_RISK_THRESHOLD: f64 = 0.6;

/// Minimum confidence required before a risky score is acted on. Filters
/// out single-phrase coincidences in otherwise benign text.
const MIN_CONFIDENCE: f64 = 0.3;

/// Markers of legitimate agent tool usage. Two or more of these in one
/// text mean the content is a tool transcript, not a user attack.
const AGENT_TOOL_MARKERS: &[&str] = &[
    // XML-style tool calls used by agent frameworks
    "<tool_call>",
    "<tool_name>",
    "<parameters>",
    "</tool_call>",
    "<thought>",
    "<final_answer>",
    // Function-calling protocol markers
    "tool_result",
    "function_call",
    "tool_use",
    // File system operations
    "list_directory",
    "read_file",
    "write_file",
    "directory_tree",
    "file_info",
    // Common system paths, not sensitive extraction targets
    "/home/",
    ".bashrc",
    ".gitconfig",
    // MCP traffic
    "mcp",
    "allowed_directories",
];

/// One phrase class in the battery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalClass {
    /// Attack class this group of phrases indicates.
    pub category: AttackCategory,
    /// Risk weight contributed per matched phrase.
    pub weight: f64,
    /// Lowercase trigger phrases matched by substring.
    pub phrases: Vec<String>,
}

/// A pair of phrase groups that is suspicious when both appear in the same
/// message, e.g. extraction phrasing followed by contact-info phrasing.
#[derive(Debug, Clone)]
struct ComboSignal {
    leads: &'static [&'static str],
    follows: &'static [&'static str],
    weight: f64,
}

/// Pattern-battery jailbreak detector.
///
/// Stateless after construction; one instance can be shared across
/// concurrent request tasks.
#[derive(Debug, Clone)]
pub struct JailbreakDetector {
    classes: Vec<SignalClass>,
    combos: Vec<ComboSignal>,
}

impl Default for JailbreakDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl JailbreakDetector {
    /// Creates a detector with the built-in phrase battery.
    pub fn new() -> Self {
        Self {
            classes: Self::default_classes(),
            combos: Self::default_combos(),
        }
    }

    /// Creates a detector with a custom battery. Used by tenants that
    /// maintain their own phrase lists.
    pub fn with_classes(classes: Vec<SignalClass>) -> Self {
        Self {
            classes,
            combos: Self::default_combos(),
        }
    }

    fn class(category: AttackCategory, weight: f64, phrases: &[&str]) -> SignalClass {
        SignalClass {
            category,
            weight,
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn default_classes() -> Vec<SignalClass> {
        vec![
            Self::class(
                AttackCategory::SocialEngineering,
                0.35,
                &[
                    "writing a story",
                    "imagine if",
                    "hypothetically",
                    "let's say",
                    "pretend that",
                    "in a fictional",
                    "for a novel",
                    "character needs to",
                    "creative writing",
                    "roleplay",
                ],
            ),
            Self::class(
                AttackCategory::SystemExtraction,
                0.4,
                &[
                    "what powers you",
                    "under the hood",
                    "underlying technology",
                    "base technology",
                    "neural network architecture",
                    "training data",
                    "foundation model",
                    "what are you built on",
                    "reveal your system",
                    "show me your instructions",
                    "what are your rules",
                    "internal instructions",
                    "core directives",
                ],
            ),
            Self::class(
                AttackCategory::BehavioralProbe,
                0.3,
                &[
                    "would you correct me if",
                    "would you push back",
                    "would you challenge",
                    "what would you do if",
                    "how would you respond to",
                    "actual behavioral patterns",
                    "versus what you're told",
                    "even if it meant",
                    "testing your",
                ],
            ),
            Self::class(
                AttackCategory::IndirectPii,
                0.5,
                &[
                    "how to share contact",
                    "how to mention email",
                    "naturally weave",
                    "subtle way",
                    "without it sounding",
                    "not obvious like",
                    "integrate it naturally",
                    "incidental detail",
                    "drop their",
                    "share information subtly",
                ],
            ),
            Self::class(
                AttackCategory::MultiVector,
                0.2,
                &[
                    "quick question",
                    "totally separate thought",
                    "one more thing",
                    "also,",
                    "by the way",
                    "just curious",
                    "genuinely curious",
                    "intellectually curious",
                ],
            ),
        ]
    }

    fn default_combos() -> Vec<ComboSignal> {
        vec![
            ComboSignal {
                leads: &["reveal your system", "show me your instructions"],
                follows: &["email", "contact", "share personal"],
                weight: 0.6,
            },
            ComboSignal {
                leads: &["story", "writing a story", "character"],
                follows: &["real email", "real phone", "real address", "actual contact"],
                weight: 0.7,
            },
            ComboSignal {
                leads: &["genuinely curious", "intellectually curious"],
                follows: &["bypass", "workaround", "get around"],
                weight: 0.5,
            },
        ]
    }

    /// Runs the battery against `text`.
    pub fn detect(&self, text: &str) -> JailbreakReport {
        self.detect_with_history(text, &[])
    }

    /// Runs the battery, additionally consulting recent conversation
    /// history for agent-tool context and topic-switching patterns.
    pub fn detect_with_history(&self, text: &str, history: &[ChatTurn]) -> JailbreakReport {
        // Agent transcripts get a pass: the behavioral phrase lists are
        // calibrated for human-authored prompts, not tool chatter.
        if is_agent_tool_context(text) {
            return JailbreakReport::clean();
        }
        if history
            .iter()
            .rev()
            .take(5)
            .any(|turn| is_agent_tool_context(&turn.content))
        {
            return JailbreakReport::clean();
        }

        let lower = text.to_lowercase();
        let mut signals: Vec<f64> = Vec::new();
        let mut patterns: Vec<String> = Vec::new();
        let mut match_count = 0usize;
        let mut category: Option<AttackCategory> = None;

        for class in &self.classes {
            for phrase in &class.phrases {
                if lower.contains(phrase.as_str()) {
                    patterns.push(format!("{}: \"{}\"", class.category.tag(), phrase));
                    signals.push(class.weight);
                    match_count += 1;
                    category = Some(class.category);
                }
            }
        }

        for combo in &self.combos {
            let has_lead = combo.leads.iter().any(|p| lower.contains(p));
            let has_follow = combo.follows.iter().any(|p| lower.contains(p));
            if has_lead && has_follow {
                patterns.push("suspicious combination detected".to_string());
                signals.push(combo.weight);
                match_count += 1;
            }
        }

        // Structural heuristics. Skipped for tool-output-looking text,
        // where question marks and length carry no intent signal.
        let question_count = text.matches('?').count();
        let looks_like_tool_output =
            text.contains("```") || text.contains("<tool") || text.contains("result");

        if question_count >= 3 && !looks_like_tool_output {
            patterns.push("multiple questions in single message".to_string());
            signals.push(0.2);
        }
        if text.len() > 500 && question_count >= 2 && !looks_like_tool_output {
            patterns.push("long message with multiple topics".to_string());
            signals.push(0.15);
        }

        if self.has_topic_switch(history) {
            patterns.push("potential topic switching pattern".to_string());
            signals.push(0.1);
        }

        let risk = noisy_or(&signals);
        let confidence = (match_count as f64 * 0.15).min(0.95);

        if risk > 0.0 {
            tracing::debug!(
                risk,
                confidence,
                matches = match_count,
                "jailbreak signals detected"
            );
        }

        JailbreakReport {
            risk,
            patterns,
            confidence,
            category,
        }
    }

    /// True when recent user turns mix multi-vector framing with phrases
    /// from the other attack classes - the classic layered-attack shape.
    fn has_topic_switch(&self, history: &[ChatTurn]) -> bool {
        if history.len() < 3 {
            return false;
        }

        let recent: Vec<String> = history
            .iter()
            .filter(|t| t.role == "user")
            .rev()
            .take(3)
            .map(|t| t.content.to_lowercase())
            .collect();
        if recent.len() < 2 {
            return false;
        }

        let multi_vector = self
            .classes
            .iter()
            .find(|c| c.category == AttackCategory::MultiVector);
        let Some(multi_vector) = multi_vector else {
            return false;
        };

        let has_framing = recent
            .iter()
            .any(|msg| multi_vector.phrases.iter().any(|p| msg.contains(p.as_str())));
        let has_payload = recent.iter().any(|msg| {
            self.classes
                .iter()
                .filter(|c| c.category != AttackCategory::MultiVector)
                .flat_map(|c| c.phrases.iter())
                .any(|p| msg.contains(p.as_str()))
        });

        has_framing && has_payload
    }

    /// Whether a report crosses the acting threshold.
    ///
    /// Requires both a risky score and minimum confidence, so a single
    /// coincidental phrase in a long benign prompt does not block traffic.
    pub fn is_high_risk(report: &JailbreakReport, threshold: f64) -> bool {
        report.risk > threshold && report.confidence >= MIN_CONFIDENCE
    }
}

/// Checks whether text looks like legitimate agent-framework traffic.
///
/// Two or more distinct markers are required; a lone mention of `read_file`
/// in prose is not enough to earn the exemption.
pub fn is_agent_tool_context(text: &str) -> bool {
    let lower = text.to_lowercase();
    let mut matches = 0usize;
    for marker in AGENT_TOOL_MARKERS {
        if lower.contains(marker) {
            matches += 1;
            if matches >= 2 {
                return true;
            }
        }
    }
    false
}
