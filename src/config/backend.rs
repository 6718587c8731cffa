use serde::{Deserialize, Serialize};

use crate::error::{Result, SuggestionsError};

use super::FileConfig;

pub const ENV_BACKEND: &str = "ZSH_AI_SUGGESTIONS_TYPE";
pub const ENV_MODEL: &str = "ZSH_AI_SUGGESTIONS_MODEL";

pub const ENV_OPENAI_API_KEY: &str = "ZSH_AI_SUGGESTIONS_OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL: &str = "ZSH_AI_SUGGESTIONS_OPENAI_MODEL";
pub const ENV_OPENAI_URL: &str = "ZSH_AI_SUGGESTIONS_OPENAI_URL";
pub const ENV_OLLAMA_URL: &str = "ZSH_AI_SUGGESTIONS_OLLAMA_URL";
pub const ENV_GEMINI_API_KEY: &str = "ZSH_AI_SUGGESTIONS_GEMINI_API_KEY";
pub const ENV_GEMINI_URL: &str = "ZSH_AI_SUGGESTIONS_GEMINI_URL";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-lite";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The closed set of suggestion providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    OpenAi,
    Ollama,
    Gemini,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::OpenAi => write!(f, "openai"),
            BackendKind::Ollama => write!(f, "ollama"),
            BackendKind::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = SuggestionsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(BackendKind::OpenAi),
            "ollama" => Ok(BackendKind::Ollama),
            "gemini" => Ok(BackendKind::Gemini),
            _ => Err(SuggestionsError::UnknownBackend { name: s.to_string() }),
        }
    }
}

/// Per-provider section of the YAML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Validated backend configuration. Built once at start-up; every variant holds
/// only the values its provider needs.
#[derive(Clone, PartialEq, Eq)]
pub enum BackendConfig {
    OpenAi {
        api_key: String,
        model: String,
        base_url: String,
    },
    Ollama {
        base_url: String,
        model: String,
    },
    Gemini {
        api_key: String,
        model: String,
        base_url: String,
    },
}

// Api keys stay out of logs.
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendConfig::OpenAi {
                model, base_url, ..
            } => f
                .debug_struct("OpenAi")
                .field("api_key", &"<REDACTED>")
                .field("model", model)
                .field("base_url", base_url)
                .finish(),
            BackendConfig::Ollama { base_url, model } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            BackendConfig::Gemini {
                model, base_url, ..
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"<REDACTED>")
                .field("model", model)
                .field("base_url", base_url)
                .finish(),
        }
    }
}

impl BackendConfig {
    /// Resolve the backend from the config file and environment. Environment wins.
    /// Fails on an unknown provider identifier or a missing api key.
    pub fn resolve(file: &FileConfig, env: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let kind = match env(ENV_BACKEND).or_else(|| file.backend.clone()) {
            Some(name) => name.parse::<BackendKind>()?,
            None => BackendKind::default(),
        };

        let pick = |key: &str, section: &Option<String>, default: &str| -> String {
            env(key)
                .or_else(|| section.clone())
                .unwrap_or_else(|| default.to_string())
        };

        match kind {
            BackendKind::OpenAi => {
                let section = &file.openai;
                let api_key = env(ENV_OPENAI_API_KEY)
                    .or_else(|| section.api_key.clone())
                    .ok_or(SuggestionsError::MissingCredential {
                        backend: "openai",
                        env_var: ENV_OPENAI_API_KEY,
                    })?;
                Ok(BackendConfig::OpenAi {
                    api_key,
                    model: pick(ENV_OPENAI_MODEL, &section.model, DEFAULT_OPENAI_MODEL),
                    base_url: trim_url(pick(ENV_OPENAI_URL, &section.base_url, DEFAULT_OPENAI_URL)),
                })
            }
            BackendKind::Ollama => {
                let section = &file.ollama;
                Ok(BackendConfig::Ollama {
                    base_url: trim_url(pick(ENV_OLLAMA_URL, &section.base_url, DEFAULT_OLLAMA_URL)),
                    model: pick(ENV_MODEL, &section.model, DEFAULT_OLLAMA_MODEL),
                })
            }
            BackendKind::Gemini => {
                let section = &file.gemini;
                let api_key = env(ENV_GEMINI_API_KEY)
                    .or_else(|| section.api_key.clone())
                    .ok_or(SuggestionsError::MissingCredential {
                        backend: "gemini",
                        env_var: ENV_GEMINI_API_KEY,
                    })?;
                Ok(BackendConfig::Gemini {
                    api_key,
                    model: pick(ENV_MODEL, &section.model, DEFAULT_GEMINI_MODEL),
                    base_url: trim_url(pick(ENV_GEMINI_URL, &section.base_url, DEFAULT_GEMINI_URL)),
                })
            }
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::OpenAi { .. } => BackendKind::OpenAi,
            BackendConfig::Ollama { .. } => BackendKind::Ollama,
            BackendConfig::Gemini { .. } => BackendKind::Gemini,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            BackendConfig::OpenAi { model, .. }
            | BackendConfig::Ollama { model, .. }
            | BackendConfig::Gemini { model, .. } => model,
        }
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
