//! Gemini-backed classifier.
//!
//! Calls the Google Generative Language REST API with a fixed data
//! classifier system instruction and temperature 0, and expects the model
//! to answer with a single JSON object matching the
//! [`Classification`](crate::Classification) contract. Anything else is
//! an error for the caller to fail open on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;
use crate::{Classification, Classifier};

/// System instruction sent with every classification request. The strict
/// output format is part of the contract; drift here breaks parsing.
const CLASSIFIER_SYSTEM_INSTRUCTION: &str = "You are a data classifier. Analyze text and \
determine if it contains specific types of sensitive data.\n\n\
Respond ONLY with valid JSON in this exact format:\n\
{\"matched\": true/false, \"snippets\": [\"matched text 1\", \"matched text 2\"]}";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    /// Config with the default public endpoint.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

/// Classifier backed by the Gemini REST API.
pub struct GeminiClassifier {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClassifier {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Reuse an existing HTTP client (connection pooling across callers).
    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    fn build_request(&self, text: &str, sensitive_description: &str) -> GenerateContentRequest {
        let user_prompt = format!(
            "Does this text contain: \"{sensitive_description}\"?\n\n\
             Text to analyze:\n\"\"\"\n{text}\n\"\"\"\n\nRespond with JSON only."
        );
        GenerateContentRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: CLASSIFIER_SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: user_prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: 200,
            },
        }
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(
        &self,
        text: &str,
        sensitive_description: &str,
    ) -> Result<Classification, ClassifyError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );
        let request = self.build_request(text, sensitive_description);

        let response: GenerateContentResponse = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(ClassifyError::EmptyResponse)?;

        parse_classification(&content)
    }
}

/// Extracts the classification JSON object from model output.
///
/// Models occasionally wrap the object in prose or code fences; the
/// contract is satisfied as long as one well-formed object is present.
pub fn parse_classification(content: &str) -> Result<Classification, ClassifyError> {
    let trimmed = content.trim();
    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ClassifyError::UnparseableResponse(
            "no JSON object in response".to_string(),
        ));
    };
    if end < start {
        return Err(ClassifyError::UnparseableResponse(
            "malformed JSON object in response".to_string(),
        ));
    }

    serde_json::from_str(&trimmed[start..=end])
        .map_err(|err| ClassifyError::UnparseableResponse(err.to_string()))
}

// Gemini REST wire types. Only the fields this crate touches.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_json() {
        let result =
            parse_classification(r#"{"matched": true, "snippets": ["jane@corp.io"]}"#).unwrap();
        assert!(result.matched);
        assert_eq!(result.snippets, vec!["jane@corp.io".to_string()]);
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let content = "Sure! Here is the result:\n```json\n{\"matched\": false, \"snippets\": []}\n```";
        let result = parse_classification(content).unwrap();
        assert!(!result.matched);
    }

    #[test]
    fn test_parse_missing_snippets_defaults_empty() {
        let result = parse_classification(r#"{"matched": true}"#).unwrap();
        assert!(result.matched);
        assert!(result.snippets.is_empty());
    }

    #[test]
    fn test_parse_no_json_is_error() {
        assert!(parse_classification("I cannot answer that.").is_err());
    }

    #[test]
    fn test_parse_garbage_json_is_error() {
        assert!(parse_classification("{matched: yes}").is_err());
    }

    #[test]
    fn test_request_shape() {
        let classifier = GeminiClassifier::new(GeminiConfig::new("key", "gemini-2.5-flash"));
        let request = classifier.build_request("body text", "employee emails");
        let json = serde_json::to_value(&request).unwrap();

        assert!(json["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("data classifier"));
        assert_eq!(json["generationConfig"]["temperature"], 0.0);
        assert!(json["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("employee emails"));
    }
}
