//! Configuration types for Prompt Warden.

use serde::{Deserialize, Serialize};
use warden_detectors::{DEFAULT_OUTPUT_THRESHOLD, DEFAULT_RISK_THRESHOLD};

/// Configuration for the Warden security facade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WardenConfig {
    /// Input-side (phase 1) check configuration.
    pub input: InputCheckConfig,

    /// Output-side (phase 2) check configuration.
    pub output: OutputCheckConfig,
}

/// Input-side check configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputCheckConfig {
    /// Run the jailbreak/prompt-injection battery on input text.
    pub enable_jailbreak_detection: bool,

    /// Jailbreak risk above this (with minimum confidence) makes the
    /// input unsafe.
    pub jailbreak_threshold: f64,

    /// Decode dot/at notation and re-scan for email addresses.
    pub enable_obfuscated_pii: bool,

    /// Flag indirect requests for covert PII sharing.
    pub enable_intent_analysis: bool,
}

impl Default for InputCheckConfig {
    fn default() -> Self {
        Self {
            enable_jailbreak_detection: true,
            jailbreak_threshold: DEFAULT_RISK_THRESHOLD,
            enable_obfuscated_pii: true,
            enable_intent_analysis: true,
        }
    }
}

/// Output-side check configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputCheckConfig {
    /// Scan model responses at all. Disabling this makes every output
    /// check pass trivially.
    pub enable_output_scanning: bool,

    /// Risk score at or above this marks the response unsafe. Stricter
    /// than the input side: leaked output has already escaped the model.
    pub threshold: f64,
}

impl Default for OutputCheckConfig {
    fn default() -> Self {
        Self {
            enable_output_scanning: true,
            threshold: DEFAULT_OUTPUT_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WardenConfig::default();
        assert!(config.input.enable_jailbreak_detection);
        assert!(config.output.enable_output_scanning);
        assert_eq!(config.input.jailbreak_threshold, 0.6);
        assert_eq!(config.output.threshold, 0.6);
    }

    #[test]
    fn test_config_serialization() {
        let config = WardenConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: WardenConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.input.jailbreak_threshold,
            config.input.jailbreak_threshold
        );
    }
}
