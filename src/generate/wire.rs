//! Wire types for the Gemini `generateContent` envelope, trimmed to the
//! text-in / text-out subset this crate uses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct GenerateContentRequest {
    pub(super) contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub(super) generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(super) struct Content {
    pub(super) parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub(super) struct Part {
    pub(super) text: String,
}

#[derive(Debug, Serialize)]
pub(super) struct GenerationConfig {
    pub(super) temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    pub(super) max_output_tokens: u32,
}

impl GenerateContentRequest {
    pub(super) fn single_turn(prompt: &str, temperature: f64, max_output_tokens: u32) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateContentResponse {
    pub(super) candidates: Option<Vec<Candidate>>,
    pub(super) error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Candidate {
    pub(super) content: CandidateContent,
}

#[derive(Debug, Deserialize)]
pub(super) struct CandidateContent {
    #[serde(default)]
    pub(super) parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResponsePart {
    pub(super) text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiError {
    pub(super) message: String,
}

impl GenerateContentResponse {
    /// The generated text at `candidates[0].content.parts[0].text`, if the
    /// envelope carries one.
    pub(super) fn generated_text(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_camel_case_config() {
        let request = GenerateContentRequest::single_turn("Hello", 0.7, 1000);
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"text\":\"Hello\""));
        assert!(json.contains("\"temperature\":0.7"));
        assert!(json.contains("\"maxOutputTokens\":1000"));
    }

    #[test]
    fn generated_text_walks_the_envelope() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"payload"}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.generated_text(), Some("payload"));
    }

    #[test]
    fn generated_text_absent_when_parts_empty() {
        let json = r#"{"candidates":[{"content":{"parts":[]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.generated_text(), None);
    }

    #[test]
    fn error_envelope_deserializes() {
        let json = r#"{"error":{"message":"API key not valid"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.error.unwrap().message, "API key not valid");
    }
}
