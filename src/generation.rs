//! LLM generation provider abstraction and implementations.
//!
//! Defines the [`GenerationProvider`] trait and concrete implementations:
//! - **[`DisabledGenerator`]** — returns errors; used when no LLM backend is
//!   configured.
//! - **[`GeminiGenerator`]** — calls the Gemini `generateContent` API.
//!
//! Unlike the embedding client, generation performs no automatic retry: a
//! failed or timed-out call surfaces as [`Error::Generation`] and the caller
//! must re-issue the request.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::error::{Error, Result};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Prompt → answer backend.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"gemini-1.5-flash"`).
    fn model_name(&self) -> &str;

    /// Generate an answer for the assembled prompt. The returned text is
    /// whitespace-trimmed and non-empty; an empty model response is an
    /// [`Error::Generation`].
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Create the appropriate [`GenerationProvider`] from configuration.
pub fn create_provider(config: &GenerationConfig) -> Result<Arc<dyn GenerationProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledGenerator)),
        "gemini" => Ok(Arc::new(GeminiGenerator::new(config)?)),
        other => Err(Error::Generation(format!(
            "unknown generation provider: {}",
            other
        ))),
    }
}

// ============ Disabled provider ============

/// A no-op generation provider that always returns errors.
pub struct DisabledGenerator;

#[async_trait]
impl GenerationProvider for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::Generation(
            "generation provider is disabled".to_string(),
        ))
    }
}

// ============ Gemini provider ============

/// Generation provider backed by the Gemini `generateContent` endpoint.
///
/// Requires the `GEMINI_API_KEY` environment variable. The HTTP client
/// carries the configured timeout so a hung backend fails the request
/// instead of blocking it.
pub struct GeminiGenerator {
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let model = config.model.clone().ok_or_else(|| {
            Error::Generation("generation.model required for gemini provider".to_string())
        })?;
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            Error::Generation("GEMINI_API_KEY environment variable not set".to_string())
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Generation(e.to_string()))?;

        Ok(Self {
            model,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl GenerationProvider for GeminiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "Gemini API error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;
        parse_generate_response(&json)
    }
}

/// Parse the Gemini `generateContent` response JSON into trimmed answer
/// text. Multiple parts in the first candidate are concatenated.
fn parse_generate_response(json: &serde_json::Value) -> Result<String> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| Error::Generation("response contained no candidates".to_string()))?;

    let mut text = String::new();
    for part in parts {
        if let Some(s) = part.get("text").and_then(|t| t.as_str()) {
            text.push_str(s);
        }
    }

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(Error::Generation(
            "model returned an empty response".to_string(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_generate_response_trims_text() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  An answer.\n" }] }
            }]
        });
        assert_eq!(parse_generate_response(&json).unwrap(), "An answer.");
    }

    #[test]
    fn parse_generate_response_concatenates_parts() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "part one " }, { "text": "part two" }] }
            }]
        });
        assert_eq!(parse_generate_response(&json).unwrap(), "part one part two");
    }

    #[test]
    fn empty_response_is_a_generation_error() {
        let json = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "   \n" }] } }]
        });
        let err = parse_generate_response(&json).unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn missing_candidates_is_a_generation_error() {
        let json = serde_json::json!({ "promptFeedback": {} });
        let err = parse_generate_response(&json).unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[tokio::test]
    async fn disabled_provider_errors() {
        let err = DisabledGenerator.generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }
}
