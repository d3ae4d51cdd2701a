/// ACME directory discovery and caching (spec.md §4.2)
use crate::error::{AcmeError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// The ACME directory document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Directory {
    #[serde(rename = "newNonce")]
    pub new_nonce: String,

    #[serde(rename = "newAccount")]
    pub new_account: String,

    #[serde(rename = "newOrder")]
    pub new_order: String,

    #[serde(rename = "revokeCert")]
    pub revoke_cert: String,

    #[serde(rename = "keyChange")]
    pub key_change: String,

    #[serde(rename = "renewalInfo", skip_serializing_if = "Option::is_none")]
    pub renewal_info: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<DirectoryMeta>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryMeta {
    #[serde(rename = "termsOfService")]
    pub terms_of_service: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "caaIdentities")]
    pub caa_identities: Option<Vec<String>>,
    #[serde(rename = "externalAccountRequired")]
    pub external_account_required: Option<bool>,
}

/// Fetches the directory document exactly once and serves it read-only
/// afterward — this engine never re-fetches a directory mid-session
/// (spec.md §4.2: "fetched once, treated as immutable for the session").
pub struct DirectoryCache {
    url: String,
    http_client: reqwest::Client,
    directory: OnceCell<Arc<Directory>>,
}

impl DirectoryCache {
    pub fn new(url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            http_client,
            directory: OnceCell::new(),
        }
    }

    /// Returns the cached directory, fetching it on first call.
    pub async fn get(&self) -> Result<Arc<Directory>> {
        self.directory
            .get_or_try_init(|| self.fetch())
            .await
            .cloned()
    }

    async fn fetch(&self) -> Result<Arc<Directory>> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AcmeError::transport(format!("failed to fetch directory: {}", e)))?;

        if !response.status().is_success() {
            return Err(AcmeError::protocol(format!(
                "directory fetch failed: HTTP {}",
                response.status()
            )));
        }

        let directory: Directory = response
            .json()
            .await
            .map_err(|e| AcmeError::protocol(format!("failed to parse directory: {}", e)))?;

        Ok(Arc::new(directory))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
