//! Configuration loaded from `config.toml` in the user config directory
//!
//! Every field has a default, so a missing or partial file always yields a
//! usable configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub ui: UiConfig,
}

/// Inference gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Model identifier passed to the generative-language API
    pub model: String,

    /// Per-reply output token cap
    pub max_output_tokens: usize,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Override for the built-in system instruction
    pub persona: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            max_output_tokens: 8192,
            api_key_env: "GEMINI_API_KEY".to_string(),
            persona: None,
        }
    }
}

/// Interface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Starter prompts offered on an empty chat
    pub suggestions: Vec<String>,

    /// Tick interval for the event loop, in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            suggestions: vec![
                "Create a viral marketing campaign".to_string(),
                "Design a futuristic UI component".to_string(),
                "Write a deep philosophical essay".to_string(),
                "Architect a scalable backend system".to_string(),
            ],
            tick_rate_ms: 100,
        }
    }
}

impl Config {
    /// Load from the config file, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    /// Write the current configuration back out, creating directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = directories::ProjectDirs::from("", "", "qai")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gateway.model, "gemini-2.5-flash");
        assert_eq!(config.gateway.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.gateway.max_output_tokens, 8192);
        assert_eq!(config.ui.suggestions.len(), 4);
        assert_eq!(config.ui.tick_rate_ms, 100);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [gateway]
            model = "gemini-2.5-pro"
            "#,
        )
        .unwrap();
        assert_eq!(config.gateway.model, "gemini-2.5-pro");
        assert_eq!(config.gateway.max_output_tokens, 8192);
        assert_eq!(config.ui.tick_rate_ms, 100);
    }

    #[test]
    fn test_round_trip() {
        let mut config = Config::default();
        config.gateway.persona = Some("You are terse.".to_string());
        config.ui.tick_rate_ms = 50;

        let serialized = toml::to_string_pretty(&config).unwrap();
        let restored: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(restored.gateway.persona.as_deref(), Some("You are terse."));
        assert_eq!(restored.ui.tick_rate_ms, 50);
    }
}
