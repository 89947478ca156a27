//! Generation service seam and the Gemini `generateContent` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Upstream error bodies are cut to this many characters before they reach errors and logs.
const MAX_ERROR_BODY_CHARS: usize = 512;

fn truncate_body(body: String) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation API key is not configured (set VERTEX_API_KEY)")]
    MissingApiKey,
    #[error("failed to build generation client: {0}")]
    Client(String),
    #[error("generation request failed: {0}")]
    Transport(String),
    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode generation response: {0}")]
    Decode(String),
    #[error("generation timed out after {0}s")]
    Timeout(u64),
}

/// Prompt in, analysis text out. `Ok(None)` means the service answered but produced no text.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    /// Base URL up to and including the API version, without a trailing slash.
    pub endpoint: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate. Empty text counts as absent.
    pub fn first_candidate_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.is_empty())
    }
}

/// REST client for Gemini `generateContent`.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(cfg: GeminiConfig) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| GenerationError::Client(err.to_string()))?;
        let url = cfg.generate_url();
        Ok(Self {
            http,
            url,
            api_key: cfg.api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        let response = self
            .http
            .post(&self.url)
            .header(API_KEY_HEADER, api_key)
            .json(&GenerateRequest::new(prompt))
            .send()
            .await
            .map_err(|err| GenerationError::Transport(err.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = truncate_body(response.text().await.unwrap_or_default());
            tracing::warn!(
                status = status.as_u16(),
                "generation service rejected request"
            );
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::Decode(err.without_url().to_string()))?;
        Ok(body.first_candidate_text())
    }
}
