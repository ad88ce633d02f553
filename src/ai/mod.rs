//! AI service module for speech transcription and workout parsing
//!
//! The rest of the crate only sees the [`AiBackend`] trait. This module is
//! split into several submodules:
//! - `errors`: the [`AiError`] type shared by every backend
//! - `gemini`: Google Gemini (multimodal, transcribes audio inline)
//! - `openai`: OpenAI (Whisper transcription + chat completions)
//! - `resilient`: retry and circuit-breaker wrapper around any backend

pub mod errors;
pub mod gemini;
pub mod openai;
pub mod resilient;

use async_trait::async_trait;

use crate::config::{AiConfig, AiProvider};
use crate::workout::WorkoutRecord;

pub use errors::AiError;
pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;
pub use resilient::ResilientBackend;

/// Recorded speech handed to a transcription backend
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `audio/wav`
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime_type: &str) -> Self {
        Self {
            bytes,
            mime_type: mime_type.to_string(),
        }
    }

    /// Browser and desktop recorders produce WAV by default
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "audio/wav")
    }
}

/// Text in, structured record (or error) out
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Provider name used in logs and error messages
    fn name(&self) -> &str;

    /// Verbatim transcription of recorded speech
    async fn transcribe(&self, audio: &AudioClip) -> Result<String, AiError>;

    /// Extract a workout record from a natural-language description
    async fn parse_workout(&self, text: &str) -> Result<WorkoutRecord, AiError>;
}

pub(crate) const TRANSCRIBE_PROMPT: &str =
    "Listen to this audio and provide a verbatim transcription of the speech.";

/// Instructions sent with every workout description
pub(crate) fn workout_prompt(text: &str) -> String {
    format!(
        r#"Extract workout data from the following text into a JSON object.
Text: "{text}"

The JSON should have these keys:
- "Exercise": (string) name of exercise
- "Target_Muscle": (string) primary muscle group worked
- "Region": (string) e.g. Upper Body, Lower Body, Core, Full Body
- "Target_Sets_Reps": (string) e.g. "3x10", "4 sets of 8"
- "Min_Weight": (number) minimum weight used (in kg/lbs, just number)
- "Max_Weight": (number) maximum weight used
- "Reps": (string or number) total reps or reps per set
- "Notes": (string) any specific notes mentioned

If any field is not mentioned, infer it if obvious (like Muscle/Region for common exercises), or set to null/empty string.
Return only the JSON object, no markdown."#
    )
}

/// Strip a markdown code fence from a model reply, if there is one
///
/// Models are told to answer with bare JSON but often wrap it anyway.
pub fn extract_json_block(reply: &str) -> &str {
    let body = if let Some((_, rest)) = reply.split_once("```json") {
        rest
    } else if let Some((_, rest)) = reply.split_once("```") {
        rest
    } else {
        return reply.trim();
    };
    body.split("```").next().unwrap_or(body).trim()
}

/// Decode a workout record from a model reply
pub(crate) fn workout_from_reply(reply: &str) -> Result<WorkoutRecord, AiError> {
    let json = extract_json_block(reply);
    serde_json::from_str(json).map_err(|e| {
        AiError::InvalidResponse(format!("Workout reply is not the expected JSON: {e}"))
    })
}

/// Create the configured provider's backend, wrapped with retry and circuit breaker
pub fn build_backend(config: &AiConfig) -> Box<dyn AiBackend> {
    let model = config.model.clone();
    let api_key = config.api_key.clone();
    match config.provider {
        AiProvider::Gemini => Box::new(ResilientBackend::new(
            GeminiBackend::new(api_key, model),
            &config.recovery,
        )),
        AiProvider::OpenAi => Box::new(ResilientBackend::new(
            OpenAiBackend::new(api_key, model),
            &config.recovery,
        )),
    }
}
