//! LLM provider abstraction and implementations.
//!
//! Supports Anthropic Claude, `OpenAI` and Google Gemini via a common trait.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use crate::AiError;

/// Upper bound on generated tokens. Answers are a few sentences.
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Trait for text-generation providers.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short provider name for logging.
    fn name(&self) -> &str;

    /// Generates a completion for a single user `prompt`.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or the provider rejects it.
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

/// Creates a text generator based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `ANTHROPIC_API_KEY` set -> Anthropic Claude
/// 2. `OPENAI_API_KEY` or `AI_BASE_URL` set -> `OpenAI`-compatible
/// 3. `GEMINI_API_KEY` set -> Google Gemini
///
/// `AI_MODEL` overrides the provider's default model.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no credentials are found or the
/// explicitly requested provider is not configured.
pub fn create_generator_from_env() -> Result<Box<dyn TextGenerator>, AiError> {
    let provider = std::env::var("AI_PROVIDER").unwrap_or_else(|_| detect_provider());
    let model = std::env::var("AI_MODEL").ok();

    match provider.to_lowercase().as_str() {
        "anthropic" | "claude" => {
            let api_key = require_env("ANTHROPIC_API_KEY")?;
            let model = model.unwrap_or_else(|| anthropic::DEFAULT_MODEL.to_string());
            Ok(Box::new(anthropic::AnthropicProvider::new(api_key, model)))
        }
        "openai" | "gpt" => {
            let base_url = std::env::var("AI_BASE_URL").ok();
            // Local servers usually run without authentication.
            let api_key = match (&base_url, std::env::var("OPENAI_API_KEY")) {
                (_, Ok(key)) => Some(key),
                (Some(_), Err(_)) => None,
                (None, Err(_)) => Some(require_env("OPENAI_API_KEY")?),
            };
            let model = model.unwrap_or_else(|| openai::DEFAULT_MODEL.to_string());
            let provider = openai::OpenAiProvider::new(api_key, model);
            Ok(Box::new(match base_url {
                Some(url) => provider.with_base_url(url),
                None => provider,
            }))
        }
        "gemini" | "google" => {
            let api_key = require_env("GEMINI_API_KEY")?;
            let model = model.unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string());
            Ok(Box::new(gemini::GeminiProvider::new(api_key, model)))
        }
        other => Err(AiError::Config {
            message: format!(
                "Unknown AI provider: {other}. Use 'anthropic', 'openai', or 'gemini'."
            ),
        }),
    }
}

fn require_env(name: &str) -> Result<String, AiError> {
    std::env::var(name).map_err(|_| AiError::Config {
        message: format!("{name} environment variable not set"),
    })
}

/// Auto-detects which provider to use based on available credentials.
///
/// Returns a provider name string that matches the arms in
/// [`create_generator_from_env`].
fn detect_provider() -> String {
    if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Anthropic (ANTHROPIC_API_KEY found)");
        return "anthropic".to_string();
    }

    if std::env::var("OPENAI_API_KEY").is_ok() || std::env::var("AI_BASE_URL").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI-compatible");
        return "openai".to_string();
    }

    if std::env::var("GEMINI_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Gemini (GEMINI_API_KEY found)");
        return "gemini".to_string();
    }

    log::warn!(
        "No AI credentials detected. Set one of: ANTHROPIC_API_KEY, OPENAI_API_KEY, \
         AI_BASE_URL or GEMINI_API_KEY. You can also set AI_PROVIDER explicitly."
    );

    // Fall back to anthropic, which produces a clear error about the missing key
    "anthropic".to_string()
}

/// Builds a provider error from a non-success response body.
///
/// Providers wrap messages as `{"error": {"message": ...}}`; anything else
/// is reported with the raw status and body.
fn provider_error(status: reqwest::StatusCode, body: &str) -> AiError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {status}: {body}"));
    AiError::Provider { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_prefers_message_field() {
        let err = provider_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error":{"type":"invalid_request_error","message":"bad model"}}"#,
        );
        assert_eq!(err.to_string(), "Provider error: bad model");
    }

    #[test]
    fn provider_error_falls_back_to_body() {
        let err = provider_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(
            err.to_string(),
            "Provider error: HTTP 502 Bad Gateway: upstream down"
        );
    }
}
