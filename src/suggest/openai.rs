use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SuggestionsError};

use super::{api_error, prompt, Suggester};

const ROLE_SYSTEM: &str = "system";
const ROLE_USER: &str = "user";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI chat-completions backend.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url,
        }
    }
}

#[async_trait]
impl Suggester for OpenAiClient {
    async fn suggest(&self, input: &str) -> Result<String> {
        let system = prompt::build(input);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: ROLE_SYSTEM,
                    content: &system,
                },
                ChatMessage {
                    role: ROLE_USER,
                    content: input,
                },
            ],
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(api_error("openai", resp).await);
        }

        let body: ChatResponse = resp.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(SuggestionsError::EmptySuggestion { backend: "openai" })
    }

    fn name(&self) -> &str {
        "openai"
    }
}
