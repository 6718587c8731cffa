use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SuggestionsError};

use super::{api_error, prompt, Suggester};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Local Ollama backend (`/api/generate`, non-streaming).
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(http: reqwest::Client, base_url: String, model: String) -> Self {
        Self {
            http,
            base_url,
            model,
        }
    }
}

#[async_trait]
impl Suggester for OllamaClient {
    async fn suggest(&self, input: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: prompt::build(input),
            stream: false,
        };

        let resp = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(api_error("ollama", resp).await);
        }

        let body: GenerateResponse = resp.json().await?;
        if body.response.is_empty() {
            return Err(SuggestionsError::EmptySuggestion { backend: "ollama" });
        }
        Ok(body.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
