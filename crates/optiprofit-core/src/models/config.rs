//! Configuration structures for extraction, history and the parse proxy.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{OptiError, Result};
use crate::extract::ExtractorKind;

/// Main configuration for optiprofit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptiConfig {
    /// Extractor selection.
    pub extraction: ExtractionConfig,

    /// Parse proxy client configuration.
    pub remote: RemoteConfig,

    /// Language model configuration.
    pub llm: LlmConfig,

    /// History configuration.
    pub history: HistoryConfig,

    /// Parse proxy server configuration.
    pub server: ServerConfig,
}

/// Extractor selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extractor used when the caller does not pick one.
    pub default_extractor: ExtractorKind,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_extractor: ExtractorKind::Local,
        }
    }
}

/// Client side of the parse proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Full URL of the proxy's parse endpoint.
    pub parse_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            parse_url: "http://localhost:3001/parse".to_string(),
            timeout_secs: 30,
        }
    }
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,

    /// Model name.
    pub model: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

/// Check history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// History file; defaults to the platform data directory when unset.
    pub path: Option<PathBuf>,

    /// Number of entries kept, newest first.
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            limit: crate::history::HISTORY_LIMIT,
        }
    }
}

/// Parse proxy server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,

    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

impl OptiConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| OptiError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| OptiError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment overrides (`OPENAI_MODEL`, `PORT`, `OPTIPROFIT_PARSE_URL`).
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(model) = lookup("OPENAI_MODEL").filter(|m| !m.trim().is_empty()) {
            self.llm.model = model;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(url) = lookup("OPTIPROFIT_PARSE_URL").filter(|u| !u.trim().is_empty()) {
            self.remote.parse_url = url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = OptiConfig::default();
        assert_eq!(config.extraction.default_extractor, ExtractorKind::Local);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.history.limit, 200);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: OptiConfig =
            serde_json::from_str(r#"{"llm": {"model": "gpt-4o"}, "extraction": {"default_extractor": "llm"}}"#)
                .unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.extraction.default_extractor, ExtractorKind::Llm);
        assert_eq!(config.remote.parse_url, "http://localhost:3001/parse");
    }

    #[test]
    fn test_env_overrides() {
        let config = OptiConfig::default().with_overrides(|key| match key {
            "OPENAI_MODEL" => Some("gpt-4.1-mini".to_string()),
            "PORT" => Some("8080".to_string()),
            _ => None,
        });
        assert_eq!(config.llm.model, "gpt-4.1-mini");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.remote.parse_url, "http://localhost:3001/parse");
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        let config = OptiConfig::default().with_overrides(|key| match key {
            "PORT" => Some("not-a-port".to_string()),
            _ => None,
        });
        assert_eq!(config.server.port, 3001);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = OptiConfig::default();
        config.history.limit = 50;
        config.save(&path).unwrap();

        let loaded = OptiConfig::from_file(&path).unwrap();
        assert_eq!(loaded.history.limit, 50);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(OptiConfig::from_file(&missing), Err(OptiError::Io(_))));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{\"server\": {\"port\": \"high\"}}").unwrap();
        match OptiConfig::from_file(&broken) {
            Err(OptiError::Config(msg)) => assert!(msg.contains("broken.json")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
