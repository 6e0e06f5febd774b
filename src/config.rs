use crate::error::ChatBridgeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_telegram_bot_token() -> String {
    String::new()
}
fn default_api_key() -> String {
    String::new()
}
fn default_model() -> String {
    "deepseek-chat".into()
}
fn default_data_dir() -> String {
    "./chatbridge.data".into()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_telegram_bot_token")]
    pub telegram_bot_token: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub llm_base_url: Option<String>,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Config {
    pub fn resolve_config_path() -> Result<Option<PathBuf>, ChatBridgeError> {
        // 1. Check CHATBRIDGE_CONFIG env var for custom path
        if let Ok(custom) = std::env::var("CHATBRIDGE_CONFIG") {
            if std::path::Path::new(&custom).exists() {
                return Ok(Some(PathBuf::from(custom)));
            }
            return Err(ChatBridgeError::Config(format!(
                "CHATBRIDGE_CONFIG points to non-existent file: {custom}"
            )));
        }

        if std::path::Path::new("./chatbridge.config.yaml").exists() {
            return Ok(Some(PathBuf::from("./chatbridge.config.yaml")));
        }
        if std::path::Path::new("./chatbridge.config.yml").exists() {
            return Ok(Some(PathBuf::from("./chatbridge.config.yml")));
        }
        Ok(None)
    }

    /// Load config from YAML file.
    pub fn load() -> Result<Self, ChatBridgeError> {
        let yaml_path = Self::resolve_config_path()?;

        if let Some(path) = yaml_path {
            let path_str = path.to_string_lossy().to_string();
            let content = std::fs::read_to_string(&path)
                .map_err(|e| ChatBridgeError::Config(format!("Failed to read {path_str}: {e}")))?;
            let mut config: Config = serde_yaml::from_str(&content)
                .map_err(|e| ChatBridgeError::Config(format!("Failed to parse {path_str}: {e}")))?;
            config.post_deserialize()?;
            return Ok(config);
        }

        Err(ChatBridgeError::Config(
            "No chatbridge.config.yaml found. Create one next to the binary or point CHATBRIDGE_CONFIG at it.".into(),
        ))
    }

    /// Apply post-deserialization normalization and validation.
    pub(crate) fn post_deserialize(&mut self) -> Result<(), ChatBridgeError> {
        if self.model.trim().is_empty() {
            self.model = default_model();
        }

        // Filter empty llm_base_url
        if let Some(ref url) = self.llm_base_url {
            if url.trim().is_empty() {
                self.llm_base_url = None;
            }
        }
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }

        // Validate required fields
        if self.telegram_bot_token.trim().is_empty() {
            return Err(ChatBridgeError::Config(
                "telegram_bot_token is required".into(),
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(ChatBridgeError::Config("api_key is required".into()));
        }

        Ok(())
    }
}

/// Short masked form of a secret for startup logs. Secrets never appear in
/// full anywhere in the log stream.
pub fn masked(secret: &str) -> String {
    if secret.chars().count() <= 8 {
        return "***".into();
    }
    let prefix: String = secret.chars().take(8).collect();
    format!("{prefix}...")
}
