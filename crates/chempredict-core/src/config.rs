use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the ChemPredict client.
///
/// Loaded from `~/.chempredict/config.toml` by default. Every section falls
/// back to its defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChemPredictConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl ChemPredictConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ChemPredictConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Remote prediction/chat service endpoints.
///
/// There is deliberately no timeout here: the transport decides how long a
/// request may stay pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Rule-based predictor.
    pub predict_path: String,
    /// Model-backed predictor.
    pub predict_all_path: String,
    pub chat_path: String,
    pub chat_clear_path: String,
    pub health_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            predict_path: "/predict".to_string(),
            predict_all_path: "/predict_all".to_string(),
            chat_path: "/chat".to_string(),
            chat_clear_path: "/chat/clear".to_string(),
            health_path: "/".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Join the base URL with an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Research chat settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Prefix of the generated session token.
    pub session_prefix: String,
    /// Messages longer than this (in characters) are not sent.
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            session_prefix: "user-session-".to_string(),
            max_message_length: 2000,
        }
    }
}

/// Report export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory exported reports are written to.
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChemError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ChemPredictConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.service.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.service.predict_path, "/predict");
        assert_eq!(config.service.predict_all_path, "/predict_all");
        assert_eq!(config.service.chat_path, "/chat");
        assert_eq!(config.chat.session_prefix, "user-session-");
        assert_eq!(config.chat.max_message_length, 2000);
        assert_eq!(config.report.output_dir, ".");
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"

[service]
base_url = "http://lab.internal:9000"
predict_path = "/v2/predict"

[report]
output_dir = "/tmp/reports"
"#;
        let file = create_temp_config(content);
        let config = ChemPredictConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.service.base_url, "http://lab.internal:9000");
        assert_eq!(config.service.predict_path, "/v2/predict");
        // Unspecified fields in a present section keep their defaults
        assert_eq!(config.service.chat_path, "/chat");
        assert_eq!(config.report.output_dir, "/tmp/reports");
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = ChemPredictConfig::load(file.path()).unwrap();
        assert_eq!(config.service.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.chat.max_message_length, 2000);
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("[service\nbase_url = ");
        let result = ChemPredictConfig::load(file.path());
        assert!(matches!(result, Err(ChemError::Config(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = ChemPredictConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.service.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ChemPredictConfig::default();
        config.service.base_url = "http://10.0.0.5:8000".to_string();
        config.save(&path).unwrap();

        let reloaded = ChemPredictConfig::load(&path).unwrap();
        assert_eq!(reloaded.service.base_url, "http://10.0.0.5:8000");
        assert_eq!(reloaded.chat.session_prefix, config.chat.session_prefix);
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let service = ServiceConfig {
            base_url: "http://127.0.0.1:8000/".to_string(),
            ..ServiceConfig::default()
        };
        assert_eq!(
            service.endpoint("/predict"),
            "http://127.0.0.1:8000/predict"
        );
        assert_eq!(service.endpoint("chat"), "http://127.0.0.1:8000/chat");
        assert_eq!(service.endpoint("/"), "http://127.0.0.1:8000/");
    }
}
