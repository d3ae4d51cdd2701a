//! Configuration for the ACME protocol engine.
//!
//! Scoped to what `AcmeSession` itself needs — directory URL, account
//! contacts, terms-of-service acceptance, request timeout, and the
//! storage directory `FileStore` uses. Everything the teacher's much
//! larger `AcmeSettings` covers beyond that (DNS providers, metrics,
//! renewal policy) belongs to products built on top of this engine, not
//! to the engine itself.
use crate::error::{AcmeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_directory_url")]
    pub directory_url: String,

    #[serde(default)]
    pub contact: Vec<String>,

    #[serde(default = "default_true")]
    pub terms_of_service_agreed: bool,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory_url: default_directory_url(),
            contact: Vec::new(),
            terms_of_service_agreed: default_true(),
            request_timeout_secs: default_request_timeout_secs(),
            storage_dir: default_storage_dir(),
        }
    }
}

impl Config {
    /// Parse configuration from a TOML file, then apply the same
    /// environment-variable overrides the teacher's settings loader uses.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| AcmeError::protocol(format!("invalid config TOML: {}", e)))?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ACME_DIRECTORY_URL") {
            self.directory_url = url;
        }
        if let Ok(dir) = std::env::var("ACME_STORAGE_DIR") {
            self.storage_dir = dir;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_directory_url() -> String {
    "https://acme-staging-v02.api.letsencrypt.org/directory".to_string()
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_storage_dir() -> String {
    "./acme-data".to_string()
}
