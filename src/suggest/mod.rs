pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::error::{Result, SuggestionsError};

/// A text-completion provider: turns a partial command line into a suggestion.
#[async_trait]
pub trait Suggester: Send + Sync {
    /// Produce a suggestion for `input`.
    async fn suggest(&self, input: &str) -> Result<String>;

    /// Provider name (for logging).
    fn name(&self) -> &str;
}

#[async_trait]
impl<S: Suggester + ?Sized> Suggester for Arc<S> {
    async fn suggest(&self, input: &str) -> Result<String> {
        (**self).suggest(input).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Run one suggestion call bounded by `deadline`. Expiry cancels only this call.
pub async fn suggest_within<S: Suggester + ?Sized>(
    suggester: &S,
    input: &str,
    deadline: Duration,
) -> Result<String> {
    match tokio::time::timeout(deadline, suggester.suggest(input)).await {
        Ok(result) => result,
        Err(_) => Err(SuggestionsError::DeadlineExceeded {
            timeout_ms: deadline.as_millis() as u64,
        }),
    }
}

/// Build the HTTP client shared by every backend.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("zsh-ai-suggestions/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// The backend selected at start-up. Immutable for the daemon's lifetime.
pub enum Backend {
    OpenAi(openai::OpenAiClient),
    Ollama(ollama::OllamaClient),
    Gemini(gemini::GeminiClient),
}

impl Backend {
    pub fn from_config(config: &BackendConfig, http: reqwest::Client) -> Self {
        match config {
            BackendConfig::OpenAi {
                api_key,
                model,
                base_url,
            } => Backend::OpenAi(openai::OpenAiClient::new(
                http,
                api_key.clone(),
                model.clone(),
                base_url.clone(),
            )),
            BackendConfig::Ollama { base_url, model } => Backend::Ollama(
                ollama::OllamaClient::new(http, base_url.clone(), model.clone()),
            ),
            BackendConfig::Gemini {
                api_key,
                model,
                base_url,
            } => Backend::Gemini(gemini::GeminiClient::new(
                http,
                api_key.clone(),
                model.clone(),
                base_url.clone(),
            )),
        }
    }
}

#[async_trait]
impl Suggester for Backend {
    async fn suggest(&self, input: &str) -> Result<String> {
        match self {
            Backend::OpenAi(c) => c.suggest(input).await,
            Backend::Ollama(c) => c.suggest(input).await,
            Backend::Gemini(c) => c.suggest(input).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Backend::OpenAi(c) => c.name(),
            Backend::Ollama(c) => c.name(),
            Backend::Gemini(c) => c.name(),
        }
    }
}

/// Read a non-success response into an API error.
pub(crate) async fn api_error(backend: &'static str, resp: reqwest::Response) -> SuggestionsError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    SuggestionsError::Api {
        backend,
        status,
        body,
    }
}
