//! Blocking client for the Gemini `generateContent` endpoint. Wire
//! types stay private to this module; callers only see the
//! `TextGenerator` seam.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::GeminiConfig;
use crate::plan::{GenerationError, TextGenerator};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiClient {
    cfg: GeminiConfig,
}

impl GeminiClient {
    pub fn new(cfg: GeminiConfig) -> Self {
        GeminiClient { cfg }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl TextGenerator for GeminiClient {
    fn is_configured(&self) -> bool {
        self.cfg.api_key.is_some()
    }

    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let Some(api_key) = self.cfg.api_key.as_deref() else {
            return Err(GenerationError::Unconfigured);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(self.cfg.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Failed(format!("failed to build HTTP client: {e}")))?;

        let endpoint = format!(
            "{API_BASE}/{model}:generateContent?key={api_key}",
            model = self.cfg.model
        );
        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                max_output_tokens: 1200,
                response_mime_type: "application/json",
            },
        };

        debug!(model = %self.cfg.model, prompt_len = prompt.len(), "sending generation request");
        let response = client
            .post(&endpoint)
            .json(&payload)
            .send()
            .map_err(|e| GenerationError::Failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Failed(format!(
                "Gemini returned HTTP {status}"
            )));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| GenerationError::Failed(e.to_string()))?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();
        Ok(text)
    }
}
