use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SuggestionsError};

use super::{api_error, prompt, Suggester};

#[derive(Debug, Serialize)]
struct GenerateRequest {
    system_instruction: Content,
    contents: Content,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

/// Google Gemini `generateContent` backend.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url,
        }
    }

    fn request(input: &str) -> GenerateRequest {
        GenerateRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: prompt::build(input),
                }],
            },
            contents: Content {
                parts: vec![Part {
                    text: input.to_string(),
                }],
            },
        }
    }
}

#[async_trait]
impl Suggester for GeminiClient {
    async fn suggest(&self, input: &str) -> Result<String> {
        let resp = self
            .http
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request(input))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(api_error("gemini", resp).await);
        }

        let body: GenerateResponse = resp.json().await?;
        first_text(body).ok_or(SuggestionsError::EmptySuggestion { backend: "gemini" })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

fn first_text(body: GenerateResponse) -> Option<String> {
    body.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .filter(|t| !t.is_empty())
}
