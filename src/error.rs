use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SuggestionsError {
    #[error("unknown backend: {name} (expected one of: openai, ollama, gemini)")]
    UnknownBackend { name: String },

    #[error("{backend} api key is required (set {env_var})")]
    MissingCredential {
        backend: &'static str,
        env_var: &'static str,
    },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("failed to watch {path}: {reason}")]
    Watch { path: PathBuf, reason: String },

    #[error("{backend} api error: status={status}, body={body}")]
    Api {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("no suggestion returned by {backend}")]
    EmptySuggestion { backend: &'static str },

    #[error("suggestion deadline exceeded after {timeout_ms}ms")]
    DeadlineExceeded { timeout_ms: u64 },

    #[error("no response for {path} within {waited_ms}ms")]
    ResponseTimeout { path: PathBuf, waited_ms: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SuggestionsError>;
