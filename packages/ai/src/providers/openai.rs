//! `OpenAI` chat-completions provider.
//!
//! Also talks to `OpenAI`-compatible servers (Ollama, vLLM, llama.cpp,
//! LM Studio) through [`OpenAiProvider::with_base_url`].

use serde::{Deserialize, Serialize};

use super::{MAX_OUTPUT_TOKENS, TextGenerator, provider_error};
use crate::AiError;

/// Model used when `AI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gpt-4o";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// `OpenAI` API provider.
pub struct OpenAiProvider {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new `OpenAI` provider. `api_key` may be `None` for local
    /// servers that do not authenticate.
    #[must_use]
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Points the provider at a different `OpenAI`-compatible server, for
    /// example `http://localhost:11434/v1`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: [OpenAiMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

fn response_text(body: &str) -> Result<String, AiError> {
    let response: OpenAiResponse = serde_json::from_str(body)?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AiError::Provider {
            message: "No choices in OpenAI response".to_string(),
        })?;
    Ok(choice.message.content.unwrap_or_default())
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let request = OpenAiRequest {
            model: &self.model,
            messages: [OpenAiMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let mut builder = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(provider_error(status, &body));
        }

        response_text(&body)
    }
}
