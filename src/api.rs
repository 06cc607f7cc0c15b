//! Post text generation through the Gemini REST API.
//!
//! # Architecture
//!
//! - [`GenerateText`]: async trait the pipeline depends on
//! - [`GeminiClient`]: `generateContent` implementation
//! - [`build_prompt`]: the fixed copywriting instruction
//!
//! One attempt per run. Errors are returned as [`GenerateError`] and the
//! pipeline stops.

use crate::error::GenerateError;
use crate::models::GeneratedText;
use crate::utils::{redact, truncate_for_log};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Trait for async text generation.
///
/// Implementors send a prompt to a language model and return the reply text.
pub trait GenerateText {
    /// Send `prompt` and return the trimmed, non-empty reply.
    async fn generate(&self, prompt: &str) -> Result<GeneratedText, GenerateError>;
}

/// Build the instruction sent to the model for one trend and one link.
///
/// The model plays a social media copywriter and must embed `link` verbatim
/// in a call to action without adding hashtags; hashtags are appended later
/// by the composer.
pub fn build_prompt(trend: &str, link: &str) -> String {
    format!(
        "You are a social media expert creating a post for X.com. \
         Write a short, engaging post in English about this topic: '{trend}'. \
         The post MUST include a strong Call to Action that contains this exact link: {link} \
         Do NOT add any hashtags in your response. \
         Just provide the main text with the CTA and the link."
    )
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Pull the reply text out of a `generateContent` response body.
///
/// Text parts of the first candidate are concatenated and trimmed. An empty
/// result is an error carrying the block or finish reason when present.
pub fn extract_text(body: &str) -> Result<GeneratedText, GenerateError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(GenerateError::Malformed)?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {r}"))
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(GenerateError::NoContent(reason));
    };

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    let text = text.trim();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .map(|r| format!("finish reason: {r}"))
            .unwrap_or_else(|| "empty candidate".to_string());
        return Err(GenerateError::NoContent(reason));
    }
    Ok(text.to_string())
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    pub fn new(http: Client, api_key: &str, model: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl GenerateText for GeminiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<GeneratedText, GenerateError> {
        let t0 = Instant::now();
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let elapsed_ms = t0.elapsed().as_millis();

        if !status.is_success() {
            error!(%status, elapsed_ms, body = %truncate_for_log(&body, 300), "Gemini request failed");
            return Err(GenerateError::Api { status, body });
        }

        match extract_text(&body) {
            Ok(text) => {
                info!(elapsed_ms, chars = text.chars().count(), "Content generated by Gemini");
                Ok(text)
            }
            Err(e) => {
                warn!(
                    elapsed_ms,
                    error = %e,
                    response_preview = %truncate_for_log(&body, 300),
                    "Gemini reply had no usable text"
                );
                Err(e)
            }
        }
    }
}
