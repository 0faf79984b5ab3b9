//! Client configuration
//!
//! Project, dataset, and API settings are threaded explicitly through every
//! operation as a [`ClientConfig`] value rather than read from global state.
//! A config is loaded from a TOML file, then overridden from the environment:
//!
//! ```toml
//! project_id = "abc123"
//! dataset = "production"
//! api_version = "2025-02-19"
//! max_batch_size = 10
//! draft_handling = "published"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bulk::DEFAULT_MAX_BATCH_SIZE;
use crate::id::DraftHandling;
use crate::{Error, Result};

/// Default API version sent with every request
pub const DEFAULT_API_VERSION: &str = "2025-02-19";

/// Environment variables consulted by [`ClientConfig::apply_env`]
pub const ENV_PROJECT_ID: &str = "CONTENT_PROJECT_ID";
pub const ENV_DATASET: &str = "CONTENT_DATASET";
pub const ENV_API_TOKEN: &str = "CONTENT_API_TOKEN";
pub const ENV_API_VERSION: &str = "CONTENT_API_VERSION";
pub const ENV_API_HOST: &str = "CONTENT_API_HOST";

/// Read-only settings shared by all operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub dataset: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// Overrides the project-derived API host
    #[serde(default)]
    pub api_host: Option<String>,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    #[serde(default)]
    pub draft_handling: DraftHandling,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            api_version: default_api_version(),
            token: None,
            api_host: None,
            max_batch_size: default_max_batch_size(),
            draft_handling: DraftHandling::default(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_draft_handling(mut self, drafts: DraftHandling) -> Self {
        self.draft_handling = drafts;
        self
    }

    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max;
        self
    }

    /// Parse a TOML document. The result is not validated.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config file, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env();
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            project = %config.project_id,
            dataset = %config.dataset,
            "Loaded client configuration"
        );
        Ok(config)
    }

    /// Build a config from environment variables alone.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new("", "");
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `CONTENT_*` environment variables when set.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = lookup(ENV_PROJECT_ID) {
            self.project_id = v;
        }
        if let Some(v) = lookup(ENV_DATASET) {
            self.dataset = v;
        }
        if let Some(v) = lookup(ENV_API_TOKEN) {
            self.token = Some(v);
        }
        if let Some(v) = lookup(ENV_API_VERSION) {
            self.api_version = v;
        }
        if let Some(v) = lookup(ENV_API_HOST) {
            self.api_host = Some(v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(config_error("project_id is required"));
        }
        if self.dataset.trim().is_empty() {
            return Err(config_error("dataset is required"));
        }
        if self.max_batch_size == 0 {
            return Err(config_error("max_batch_size must be at least 1"));
        }
        Ok(())
    }

    /// Base URL of the HTTP API, without the version segment.
    pub fn api_base_url(&self) -> String {
        match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.sanity.io", self.project_id),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn config_error(message: &str) -> Error {
    Error::Config {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn toml_defaults() {
        let config = ClientConfig::from_toml("project_id = \"p1\"\ndataset = \"production\"\n").unwrap();

        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.max_batch_size, 10);
        assert_eq!(config.draft_handling, DraftHandling::Published);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.api_base_url(), "https://p1.api.sanity.io");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides() {
        let config = ClientConfig::from_toml(
            r#"
project_id = "p1"
dataset = "staging"
draft_handling = "preserve"
max_batch_size = 4
api_host = "http://localhost:3333/"
"#,
        )
        .unwrap();

        assert_eq!(config.draft_handling, DraftHandling::Preserve);
        assert_eq!(config.max_batch_size, 4);
        assert_eq!(config.api_base_url(), "http://localhost:3333");
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            (ENV_PROJECT_ID, "from-env"),
            (ENV_API_TOKEN, "secret"),
            (ENV_DATASET, ""),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::new("from-file", "production");
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.project_id, "from-env");
        assert_eq!(config.token.as_deref(), Some("secret"));
        // Empty values are ignored
        assert_eq!(config.dataset, "production");
    }

    #[test]
    fn validation_rejects_missing_fields() {
        assert!(ClientConfig::new("", "production").validate().is_err());
        assert!(ClientConfig::new("p1", " ").validate().is_err());
        assert!(
            ClientConfig::new("p1", "production")
                .with_max_batch_size(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn token_is_never_serialized() {
        let config = ClientConfig::new("p1", "production").with_token("secret");
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("secret"));
    }
}
