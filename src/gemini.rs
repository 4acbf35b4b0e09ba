use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::models::{ChatMessage, Role};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

// Failures of the external model; always recovered by a local reply
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error("external model timed out")]
    Timeout,
    #[error("external model returned status {0}: {1}")]
    Status(u16, String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("parse error: {0}")]
    Decode(String),
    #[error("reply too short ({0} chars)")]
    TooShort(usize),
    #[error("reply was empty")]
    Empty,
}

// Everything the model gets for one turn
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
}

/// External text generation service.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

// Gemini generateContent wire format
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, api_key: &str, base_url: &str, model: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

fn build_request(request: &GenerationRequest) -> GeminiRequest {
    let mut contents: Vec<GeminiContent> = request
        .history
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            GeminiContent::text(Some(role), &msg.content)
        })
        .collect();
    contents.push(GeminiContent::text(Some("user"), &request.message));

    GeminiRequest {
        system_instruction: GeminiContent::text(None, &request.system_instruction),
        contents,
        generation_config: GenerationConfig {
            temperature: 0.9,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1200,
        },
    }
}

fn reply_text(response: GeminiResponse) -> Result<String, GenerationError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(text)
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(&request))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(GenerationError::Status(status, body.chars().take(200).collect()));
        }

        let body = res
            .json::<GeminiResponse>()
            .await
            .map_err(|e| GenerationError::Decode(e.to_string()))?;
        reply_text(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_maps_roles_and_appends_user_turn() {
        let request = GenerationRequest {
            system_instruction: "be nice".to_string(),
            history: vec![
                ChatMessage::new(Role::User, "hello"),
                ChatMessage::new(Role::Assistant, "hi!"),
            ],
            message: "projects?".to_string(),
        };

        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(body["systemInstruction"], json!({ "parts": [{ "text": "be nice" }] }));
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2], json!({ "role": "user", "parts": [{ "text": "projects?" }] }));
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1200);
    }

    #[test]
    fn reply_joins_first_candidate_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "world" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(reply_text(response).unwrap(), "Hello world");
    }

    #[test]
    fn reply_without_candidates_is_empty() {
        let response: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(reply_text(response), Err(GenerationError::Empty));
    }

    #[test]
    fn endpoint_uses_model_path() {
        let client = GeminiClient::new(reqwest::Client::new(), "k", "http://localhost:9/", "m-1");
        assert_eq!(client.endpoint(), "http://localhost:9/v1beta/models/m-1:generateContent");
    }
}
