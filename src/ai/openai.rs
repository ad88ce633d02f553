//! # OpenAI Backend
//!
//! Transcription goes through Whisper (`/audio/transcriptions`, multipart
//! upload); workout parsing through `/chat/completions`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{workout_from_reply, workout_prompt, AiBackend, AiError, AudioClip};
use crate::workout::WorkoutRecord;

/// Chat model used for workout parsing unless overridden
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Speech-to-text model
pub const TRANSCRIPTION_MODEL: &str = "whisper-1";

const API_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// OpenAI implementation of [`AiBackend`]
pub struct OpenAiBackend {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new(api_key: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Point the backend at an OpenAI-compatible server
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::MissingApiKey(self.name().to_string()))?;
        Ok(request.bearer_auth(api_key))
    }

    /// Send a prepared request and hand back the body of a successful response
    async fn execute(&self, request: RequestBuilder) -> Result<String, AiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, "OpenAI API error");
            return Err(parse_error_response(status, body));
        }
        Ok(body)
    }
}

fn parse_error_response(status: StatusCode, body: String) -> AiError {
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.chars().take(200).collect(),
    };
    AiError::Api {
        status: status.as_u16(),
        message,
    }
}

/// File name sent with the upload; Whisper infers the container from the extension
fn upload_file_name(mime_type: &str) -> &'static str {
    match mime_type {
        "audio/mpeg" | "audio/mp3" => "speech.mp3",
        "audio/ogg" => "speech.ogg",
        "audio/webm" => "speech.webm",
        "audio/mp4" | "audio/m4a" => "speech.m4a",
        _ => "speech.wav",
    }
}

#[async_trait]
impl AiBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn transcribe(&self, audio: &AudioClip) -> Result<String, AiError> {
        let file = Part::bytes(audio.bytes.clone())
            .file_name(upload_file_name(&audio.mime_type))
            .mime_str(&audio.mime_type)
            .map_err(|e| AiError::InvalidInput(format!("Invalid audio MIME type: {e}")))?;
        let form = Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .part("file", file);

        debug!(bytes = audio.bytes.len(), "Uploading audio to Whisper");

        let request = self
            .authorized(self.client.post(self.api_url("audio/transcriptions")))?
            .multipart(form);
        let body = self.execute(request).await?;
        let parsed: TranscriptionResponse = serde_json::from_str(&body)?;
        Ok(parsed.text.trim().to_string())
    }

    async fn parse_workout(&self, text: &str) -> Result<WorkoutRecord, AiError> {
        let chat = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(workout_prompt(text)),
            }],
            temperature: 0.0,
        };

        debug!(model = %self.model, "Sending request to OpenAI chat completions");

        let request = self
            .authorized(self.client.post(self.api_url("chat/completions")))?
            .json(&chat);
        let body = self.execute(request).await?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AiError::InvalidResponse("OpenAI returned no choices".to_string()))?;
        workout_from_reply(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let backend = OpenAiBackend::new(None, None).with_base_url("http://127.0.0.1:9");

        let err = backend.parse_workout("squats").await.unwrap_err();
        assert_eq!(err, AiError::MissingApiKey("openai".to_string()));

        let err = backend
            .transcribe(&AudioClip::wav(vec![0u8; 16]))
            .await
            .unwrap_err();
        assert_eq!(err, AiError::MissingApiKey("openai".to_string()));
    }

    #[tokio::test]
    async fn test_bad_mime_type_is_not_retried() {
        use crate::ai::ResilientBackend;
        use crate::config::RecoveryConfig;

        let backend = ResilientBackend::new(
            OpenAiBackend::new(Some("key".to_string()), None).with_base_url("http://127.0.0.1:9"),
            &RecoveryConfig {
                base_retry_delay_ms: 1,
                max_retry_delay_ms: 1,
                ..Default::default()
            },
        );
        let clip = AudioClip::new(vec![0u8; 16], "not a mime type");

        let err = backend.transcribe(&clip).await.unwrap_err();
        assert!(matches!(err, AiError::InvalidInput(_)), "{err:?}");
        assert!(!err.is_retryable());
        assert_eq!(backend.circuit_breaker().failure_count(), 0);
    }

    #[test]
    fn test_parse_error_response() {
        let err = parse_error_response(
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "Incorrect API key provided"}}"#.to_string(),
        );
        assert_eq!(
            err,
            AiError::Api {
                status: 401,
                message: "Incorrect API key provided".to_string()
            }
        );
        assert!(!err.is_retryable());

        let err = parse_error_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>".to_string());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_upload_file_name() {
        assert_eq!(upload_file_name("audio/wav"), "speech.wav");
        assert_eq!(upload_file_name("audio/mpeg"), "speech.mp3");
        assert_eq!(upload_file_name("application/octet-stream"), "speech.wav");
    }

    #[test]
    fn test_chat_response_shape() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "{\"Exercise\": \"Row\"}"}}]}"#,
        )
        .unwrap();
        let reply = parsed.choices[0].message.content.as_deref().unwrap();
        assert_eq!(workout_from_reply(reply).unwrap().exercise, "Row");
    }
}
