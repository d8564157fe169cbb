use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default endpoint of the chat-completion backend.
const DEFAULT_API_URL: &str = "https://api.msiai.net/v1/chat";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    /// Chat-completion endpoint. Defaults to the hosted service.
    completion_api_url: Option<String>,
    /// Optional bearer token for the completion endpoint.
    #[serde(default)]
    completion_api_key: String,
    /// Model identifier sent with every completion request.
    model: Option<String>,
    /// Timeout for completion requests, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
    /// Directory for state files (logs, temp code files). Defaults to the
    /// current directory.
    data_dir: Option<String>,
}

fn default_request_timeout_secs() -> u64 {
    60
}

pub struct Config {
    pub telegram_bot_token: String,
    pub completion_api_url: String,
    pub completion_api_key: String,
    pub model: String,
    pub request_timeout_secs: u64,
    /// Directory for state files (logs, temp code files).
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }

        if file.request_timeout_secs == 0 {
            return Err(ConfigError::Validation("request_timeout_secs must be positive".into()));
        }

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            completion_api_url: file
                .completion_api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            completion_api_key: file.completion_api_key,
            model: file.model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
            request_timeout_secs: file.request_timeout_secs,
            data_dir,
        })
    }

    /// Shared scratch root for per-response temp files.
    pub fn scratch_dir(&self) -> PathBuf {
        self.data_dir.join("temp")
    }
}
