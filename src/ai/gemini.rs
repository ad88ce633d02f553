//! # Gemini Backend
//!
//! Google Gemini through the Generative Language `generateContent` endpoint.
//! The model is multimodal, so audio is sent inline (base64) next to the
//! transcription prompt.
//!
//! ## Configuration
//!
//! Set `GEMINI_API_KEY`; `GROWTH_AI_MODEL` overrides the default model.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{workout_from_reply, workout_prompt, AiBackend, AiError, AudioClip, TRANSCRIBE_PROMPT};
use crate::workout::WorkoutRecord;

/// Default model to use
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    /// Parts this backend never asks for (function calls and the like)
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Gemini implementation of [`AiBackend`]
pub struct GeminiBackend {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(api_key: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Point the backend at another server (proxies, tests)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Result<&str, AiError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AiError::MissingApiKey(self.name().to_string()))
    }

    async fn generate(&self, parts: Vec<ContentPart>) -> Result<String, AiError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GeminiRequest {
            contents: vec![GeminiContent { parts }],
        };

        debug!(model = %self.model, "Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            let message = serde_json::from_str::<GeminiResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)?;
        extract_text(parsed)
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(response: GeminiResponse) -> Result<String, AiError> {
    if let Some(error) = response.error {
        return Err(AiError::InvalidResponse(error.message));
    }

    let text: String = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text),
                    ContentPart::InlineData { .. } | ContentPart::Other(_) => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AiError::InvalidResponse(
            "Gemini returned no text content".to_string(),
        ));
    }
    Ok(text)
}

#[async_trait]
impl AiBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn transcribe(&self, audio: &AudioClip) -> Result<String, AiError> {
        let parts = vec![
            ContentPart::Text {
                text: TRANSCRIBE_PROMPT.to_string(),
            },
            ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: audio.mime_type.clone(),
                    data: BASE64.encode(&audio.bytes),
                },
            },
        ];
        let text = self.generate(parts).await?;
        Ok(text.trim().to_string())
    }

    async fn parse_workout(&self, text: &str) -> Result<WorkoutRecord, AiError> {
        let parts = vec![ContentPart::Text {
            text: workout_prompt(text),
        }];
        let reply = self.generate(parts).await?;
        workout_from_reply(&reply)
    }
}
