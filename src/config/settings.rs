use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SuggestionsError};
use crate::logging::LogLevel;

use super::ProviderSection;

pub const ENV_TMP_DIR: &str = "ZSH_AI_SUGGESTIONS_TMPDIR";
pub const ENV_CLEANUP_ON_EXIT: &str = "ZSH_AI_SUGGESTIONS_CLEANUP_ON_EXIT";
pub const ENV_LOG_LEVEL: &str = "ZSH_AI_SUGGESTIONS_LOG_LEVEL";

pub const DEFAULT_TMP_DIR: &str = "/tmp/zsh-ai-suggestions";

/// Raw contents of `config.yml`. Every field is optional; unset fields fall
/// through to the environment or the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Provider identifier: `openai`, `ollama` or `gemini`.
    pub backend: Option<String>,

    /// Shared IPC directory.
    pub tmp_dir: Option<PathBuf>,

    /// Run the shell liveness probe. Default: true.
    pub cleanup_on_exit: Option<bool>,

    pub log_level: Option<String>,

    /// Per-request suggestion deadline in milliseconds. Default: 5000.
    pub request_timeout_ms: Option<u64>,

    /// Wait between a write notification and reading the file. Default: 50.
    pub settle_delay_ms: Option<u64>,

    /// Liveness probe interval in seconds. Default: 10.
    pub liveness_interval_secs: Option<u64>,

    /// Shell program counted by the liveness probe. Default: `zsh`.
    pub shell_program: Option<String>,

    /// Timeout applied to every outbound HTTP call. Default: 10.
    pub http_timeout_secs: Option<u64>,

    pub openai: ProviderSection,
    pub ollama: ProviderSection,
    pub gemini: ProviderSection,
}

impl FileConfig {
    /// Load from a YAML file. Returns default if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|e| SuggestionsError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load `config.yml` from the global config directory.
    pub fn load() -> Result<Self> {
        Self::load_from(&super::dirs_global().join("config.yml"))
    }
}

/// Daemon settings after layering defaults, the config file and the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub tmp_dir: PathBuf,
    pub cleanup_on_exit: bool,
    pub log_level: LogLevel,
    pub request_timeout: Duration,
    pub settle_delay: Duration,
    pub liveness_interval: Duration,
    pub shell_program: String,
    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tmp_dir: PathBuf::from(DEFAULT_TMP_DIR),
            cleanup_on_exit: true,
            log_level: LogLevel::Info,
            request_timeout: Duration::from_secs(5),
            settle_delay: Duration::from_millis(50),
            liveness_interval: Duration::from_secs(10),
            shell_program: "zsh".into(),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl Settings {
    /// Layer the config file and then the environment over the defaults.
    pub fn resolve(file: &FileConfig, env: &dyn Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let tmp_dir = env(ENV_TMP_DIR)
            .map(PathBuf::from)
            .or_else(|| file.tmp_dir.clone())
            .unwrap_or(defaults.tmp_dir);

        // Anything but the literal "true" disables the probe.
        let cleanup_on_exit = env(ENV_CLEANUP_ON_EXIT)
            .map(|v| v == "true")
            .or(file.cleanup_on_exit)
            .unwrap_or(defaults.cleanup_on_exit);

        let log_level = env(ENV_LOG_LEVEL)
            .or_else(|| file.log_level.clone())
            .map(|level| LogLevel::parse(&level))
            .unwrap_or(defaults.log_level);

        Self {
            tmp_dir,
            cleanup_on_exit,
            log_level,
            request_timeout: file
                .request_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            settle_delay: file
                .settle_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.settle_delay),
            // The probe ticker needs a non-zero period.
            liveness_interval: file
                .liveness_interval_secs
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or(defaults.liveness_interval),
            shell_program: file
                .shell_program
                .clone()
                .unwrap_or(defaults.shell_program),
            http_timeout: file
                .http_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        }
    }
}
