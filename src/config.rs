// Process configuration - API credentials and statement location
// Loaded once at startup and passed explicitly into constructors,
// so the loader and gateway stay independently testable.

use anyhow::{Context, Result};
use std::env;

/// Default statement file when CSV_PATH is not set
pub const DEFAULT_CSV_PATH: &str = "simulated_bank_statement.csv";

/// Default OpenRouter API base (versioned root, no trailing slash)
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "openrouter/cypher-alpha:free";

/// Process-wide configuration for the assistant
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the remote model API (required)
    pub api_key: String,

    /// Path to the bank statement CSV
    pub csv_path: String,

    /// API base URL, e.g. "https://openrouter.ai/api/v1"
    pub base_url: String,

    /// Model identifier sent with every completion request
    pub model: String,
}

impl Config {
    /// Build a config with explicit values (used by tests and embedding callers)
    pub fn new(api_key: impl Into<String>, csv_path: impl Into<String>) -> Self {
        Config {
            api_key: api_key.into(),
            csv_path: csv_path.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the API base URL (mainly for pointing at a test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Read configuration from the process environment.
    ///
    /// A missing OPENROUTER_API_KEY fails here, at startup, rather than at
    /// the first request. Everything else has a default.
    pub fn from_env() -> Result<Config> {
        let api_key = env::var("OPENROUTER_API_KEY")
            .context("OPENROUTER_API_KEY is not set - the assistant cannot reach the model API")?;

        let csv_path = env::var("CSV_PATH").unwrap_or_else(|_| DEFAULT_CSV_PATH.to_string());
        let base_url =
            env::var("OPENROUTER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("OPENROUTER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Config {
            api_key,
            csv_path,
            base_url,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_uses_defaults() {
        let config = Config::new("sk-test", "statement.csv");
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.csv_path, "statement.csv");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::new("sk-test", "statement.csv")
            .with_base_url("http://localhost:8080/api/v1")
            .with_model("test/model");

        assert_eq!(config.base_url, "http://localhost:8080/api/v1");
        assert_eq!(config.model, "test/model");
    }
}
