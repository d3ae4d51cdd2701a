/// `AcmeSession`: the orchestration layer wiring `KeyMaterial`,
/// `DirectoryCache` and `JwsTransport` into the account/order/challenge
/// state machine (spec.md §4.5).
///
/// Grounded on the teacher's `AcmeClient` in `client.rs`, generalized from
/// a multi-challenge-type certificate issuance pipeline down to the dns-01
/// flow this engine implements, and split so every protocol step is its
/// own method instead of one monolithic `issue_certificate`.
use crate::account::Account;
use crate::config::Config;
use crate::crypto::KeyMaterial;
use crate::error::{AcmeError, Result};
use crate::order::csr::{generate_csr, parse_certificate_chain};
use crate::order::{Authorization, FinalizationRequest, NewOrderRequest, Order};
use crate::protocol::{AcmeResponse, DirectoryCache, JwsTransport, NonceSource, Payload};
use crate::types::Contact;
use serde_json::json;
use std::time::Duration;

pub struct AcmeSession {
    key: KeyMaterial,
    directory: DirectoryCache,
    transport: JwsTransport,
    account_url: Option<String>,
    http_client: reqwest::Client,
}

impl AcmeSession {
    /// Build a session for a fresh account key and the given directory URL,
    /// using `Config::default`'s request timeout.
    pub fn new(directory_url: impl Into<String>, key: KeyMaterial) -> Self {
        Self::with_config(directory_url, key, &Config::default())
    }

    /// Build a session whose `reqwest::Client` is configured from `config`
    /// (currently just the per-request timeout, spec.md §5).
    pub fn with_config(directory_url: impl Into<String>, key: KeyMaterial, config: &Config) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .expect("reqwest client builder should not fail for a timeout-only config");
        let directory_url = directory_url.into();
        Self {
            key,
            directory: DirectoryCache::new(directory_url, http_client.clone()),
            // `NonceSource`'s URL is resolved lazily at first use, once the
            // directory has been fetched — see `ensure_transport_ready`.
            transport: JwsTransport::new(http_client.clone(), NonceSource::new("", http_client.clone())),
            account_url: None,
            http_client,
        }
    }

    /// Resume a session for an already-registered account.
    pub fn resume(directory_url: impl Into<String>, key: KeyMaterial, account_url: String) -> Self {
        Self::resume_with_config(directory_url, key, account_url, &Config::default())
    }

    /// Resume a session for an already-registered account, using `config`'s
    /// request timeout.
    pub fn resume_with_config(
        directory_url: impl Into<String>,
        key: KeyMaterial,
        account_url: String,
        config: &Config,
    ) -> Self {
        let mut session = Self::with_config(directory_url, key, config);
        session.account_url = Some(account_url);
        session
    }

    pub fn account_url(&self) -> Option<&str> {
        self.account_url.as_deref()
    }

    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Lazily build the `JwsTransport` bound to this directory's
    /// `newNonce` endpoint. The teacher rebuilds a `NonceManager` per
    /// call; this caches the one transport for the session's lifetime
    /// instead, consistent with `DirectoryCache`'s "fetch once" contract.
    async fn ensure_transport_ready(&mut self) -> Result<()> {
        let directory = self.directory.get().await?;
        self.transport = JwsTransport::new(
            self.http_client.clone(),
            NonceSource::new(directory.new_nonce.clone(), self.http_client.clone()),
        );
        Ok(())
    }

    /// Register a new account, or rely on the server's idempotent
    /// newAccount behavior if this key is already registered.
    pub async fn register_account(
        &mut self,
        contacts: &[Contact],
        terms_of_service_agreed: bool,
    ) -> Result<Account> {
        self.ensure_transport_ready().await?;
        let directory = self.directory.get().await?;

        let contact_uris: Vec<String> = contacts.iter().map(|c| c.to_uri()).collect();
        let payload = json!({
            "termsOfServiceAgreed": terms_of_service_agreed,
            "contact": contact_uris,
        });

        let AcmeResponse { mut body, location, .. } = self
            .transport
            .request_with_jwk::<Account>(&self.key, &directory.new_account, Payload::Json(&payload))
            .await?;

        let account_url = location
            .ok_or_else(|| AcmeError::protocol("newAccount response missing Location header".to_string()))?;
        body.url = account_url.clone();
        self.account_url = Some(account_url);

        tracing::info!(account = %self.account_url.as_deref().unwrap_or(""), "account registered");
        Ok(body)
    }

    /// Re-fetch the current account state (spec.md §4.5's `fetchAccount`).
    pub async fn fetch_account(&mut self) -> Result<Account> {
        self.ensure_transport_ready().await?;
        let account_url = self.require_account_url()?.to_string();

        let AcmeResponse { mut body, .. } = self
            .transport
            .request_with_kid::<Account>(&self.key, &account_url, &account_url, Payload::PostAsGet)
            .await?;
        body.url = account_url;
        Ok(body)
    }

    /// Deactivate the account (SPEC_FULL §3 — grounded on
    /// `cmd/actionDelAccount.go`; not a Non-goal, only key rollover,
    /// revocation and EAB are excluded).
    pub async fn deactivate_account(&mut self) -> Result<Account> {
        self.ensure_transport_ready().await?;
        let account_url = self.require_account_url()?.to_string();

        let payload = json!({ "status": "deactivated" });
        let AcmeResponse { body, .. } = self
            .transport
            .request_with_kid::<Account>(&self.key, &account_url, &account_url, Payload::Json(&payload))
            .await?;
        Ok(body)
    }

    /// Create a new order for the given domains.
    pub async fn new_order(&mut self, domains: &[String]) -> Result<(String, Order)> {
        self.ensure_transport_ready().await?;
        let directory = self.directory.get().await?;
        let account_url = self.require_account_url()?.to_string();

        let request = NewOrderRequest::new(domains);
        let payload = serde_json::to_value(&request)?;

        let AcmeResponse { mut body, location, retry_after } = self
            .transport
            .request_with_kid::<Order>(&self.key, &account_url, &directory.new_order, Payload::Json(&payload))
            .await?;
        body.retry_after = retry_after;

        let order_url = location
            .ok_or_else(|| AcmeError::protocol("newOrder response missing Location header".to_string()))?;
        body.uri = order_url.clone();

        Ok((order_url, body))
    }

    /// Fetch an authorization by its URL.
    pub async fn get_authorization(&mut self, authorization_url: &str) -> Result<Authorization> {
        self.ensure_transport_ready().await?;
        let account_url = self.require_account_url()?.to_string();

        let AcmeResponse { body, .. } = self
            .transport
            .request_with_kid::<Authorization>(&self.key, &account_url, authorization_url, Payload::PostAsGet)
            .await?;

        Ok(body)
    }

    /// Derive the dns-01 key authorization digest to publish as a TXT
    /// record, per spec.md §4.5: `base64url(SHA256(token + "." +
    /// base64url(SHA256(canonicalJwk))))`.
    pub fn compute_dns_key_authorization(&self, token: &str) -> Result<String> {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use sha2::{Digest, Sha256};

        let thumbprint = self.key.thumbprint()?;
        let key_authorization = format!("{}.{}", token, thumbprint);

        let mut hasher = Sha256::new();
        hasher.update(key_authorization.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(hasher.finalize()))
    }

    /// Tell the server the dns-01 challenge is ready to be validated.
    pub async fn submit_challenge(&mut self, challenge_url: &str) -> Result<()> {
        self.ensure_transport_ready().await?;
        let account_url = self.require_account_url()?.to_string();

        let payload = json!({});
        self.transport
            .request_with_kid::<serde_json::Value>(
                &self.key,
                &account_url,
                challenge_url,
                Payload::Json(&payload),
            )
            .await?;
        Ok(())
    }

    /// Poll an order until it leaves `pending`/`processing`, honoring
    /// `Retry-After` when the server sends one and falling back to
    /// `default_interval` otherwise (spec.md §4.5/§5 suggest a 3-second
    /// floor for that fallback).
    pub async fn poll_order(
        &mut self,
        order_url: &str,
        max_attempts: u32,
        default_interval: Duration,
    ) -> Result<Order> {
        self.ensure_transport_ready().await?;
        let account_url = self.require_account_url()?.to_string();

        for _ in 0..max_attempts {
            let response = self
                .transport
                .post_as_get_raw(&self.key, &account_url, order_url)
                .await?;

            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0);

            let mut order: Order = response
                .json()
                .await
                .map_err(|e| AcmeError::protocol(format!("failed to parse order: {}", e)))?;
            order.retry_after = retry_after_secs;
            order.uri = order_url.to_string();

            if !matches!(order.status.as_str(), "pending" | "processing") {
                return Ok(order);
            }

            let sleep_duration = if retry_after_secs > 0 {
                Duration::from_secs(retry_after_secs)
            } else {
                default_interval
            };
            tokio::time::sleep(sleep_duration).await;
        }

        Err(AcmeError::state(format!(
            "order {} did not leave pending/processing after {} attempts",
            order_url, max_attempts
        )))
    }

    /// Build a CSR for `domains`, finalize the order, and return the
    /// freshly-generated leaf private key (PEM) alongside the updated
    /// order.
    pub async fn finalize(&mut self, order: &Order, domains: &[String]) -> Result<(Order, String)> {
        self.ensure_transport_ready().await?;
        let account_url = self.require_account_url()?.to_string();

        let (csr_b64, private_key_pem) = generate_csr(domains)?;
        let request = FinalizationRequest { csr: csr_b64 };
        let payload = serde_json::to_value(&request)?;

        let AcmeResponse { mut body, retry_after, location } = self
            .transport
            .request_with_kid::<Order>(&self.key, &account_url, &order.finalize, Payload::Json(&payload))
            .await?;
        body.retry_after = retry_after;
        body.uri = location.unwrap_or_else(|| order.uri.clone());

        Ok((body, private_key_pem))
    }

    /// Download the issued certificate chain as PEM.
    pub async fn download_certificate(&mut self, certificate_url: &str) -> Result<String> {
        self.ensure_transport_ready().await?;
        let account_url = self.require_account_url()?.to_string();

        let response = self
            .transport
            .post_as_get_raw(&self.key, &account_url, certificate_url)
            .await?;

        let pem = response
            .text()
            .await
            .map_err(|e| AcmeError::transport(format!("failed to read certificate body: {}", e)))?;

        // Confirms the response is well-formed before handing it back.
        parse_certificate_chain(&pem)?;

        Ok(pem)
    }

    fn require_account_url(&self) -> Result<&str> {
        self.account_url
            .as_deref()
            .ok_or_else(|| AcmeError::state("no account registered for this session".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_dns_key_authorization_is_deterministic() {
        let key = KeyMaterial::generate().unwrap();
        let session = AcmeSession::new("https://example.com/directory", key);
        let a = session.compute_dns_key_authorization("token123").unwrap();
        let b = session.compute_dns_key_authorization("token123").unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn require_account_url_errors_before_registration() {
        let key = KeyMaterial::generate().unwrap();
        let session = AcmeSession::new("https://example.com/directory", key);
        assert!(session.require_account_url().is_err());
    }
}
