use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ParleyError, Result};
use crate::settings::ModelId;

/// Gateway model configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: ModelId,
    #[serde(default)]
    pub stream: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: ModelId::default(),
            stream: true,
        }
    }
}

/// Search tool configuration. The Tavily key is optional and gates only
/// the Tavily tool; the DuckDuckGo tool needs no key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default)]
    pub tavily_api_key: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> usize {
    3
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&raw).map_err(|err| {
            ParleyError::Configuration(format!("failed to parse configuration: {err}"))
        })?;
        Ok(cfg)
    }

    /// Environment-only configuration, the way the demos run.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    pub fn from_env_or_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut cfg = Self::from_file(path)?;
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = env::var("GROQ_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Ok(base_url) = env::var("PARLEY_BASE_URL") {
            self.model.base_url = Some(base_url);
        }
        if let Ok(model) = env::var("PARLEY_MODEL") {
            if let Some(parsed) = ModelId::parse(&model) {
                self.model.model = parsed;
            }
        }
        if let Ok(stream) = env::var("PARLEY_STREAMING") {
            if let Ok(parsed) = stream.parse::<bool>() {
                self.model.stream = parsed;
            }
        }
        if let Ok(key) = env::var("TAVILY_API_KEY") {
            self.search.tavily_api_key = Some(key);
        }
        if let Ok(max) = env::var("PARLEY_SEARCH_RESULTS") {
            if let Ok(parsed) = max.parse::<usize>() {
                self.search.max_results = parsed.max(1);
            }
        }
    }

    /// The gateway credential, required before any session starts.
    pub fn require_api_key(&self) -> Result<&str> {
        self.model.api_key.as_deref().ok_or_else(|| {
            ParleyError::Configuration(
                "GROQ_API_KEY not found. Please set it in your environment or config file.".into(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_and_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[model]\napi_key='file-key'\nmodel='qwen/qwen3-32b'\n[search]\nmax_results=5"
        )
        .unwrap();

        env::set_var("PARLEY_BASE_URL", "http://localhost:9999/v1");
        let cfg = AppConfig::from_env_or_file(file.path()).unwrap();

        assert_eq!(cfg.model.model, ModelId::Qwen3_32b);
        assert_eq!(cfg.search.max_results, 5);
        assert_eq!(cfg.model.base_url.as_deref(), Some("http://localhost:9999/v1"));
        env::remove_var("PARLEY_BASE_URL");
    }

    #[test]
    fn missing_credential_is_a_configuration_error() {
        let cfg = AppConfig::default();
        let err = cfg.require_api_key().unwrap_err();
        assert!(matches!(err, ParleyError::Configuration(_)));
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }
}
