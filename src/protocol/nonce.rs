/// Replay-nonce acquisition (spec.md §4.3)
///
/// Unlike the teacher's `NonceManager`, this does not pool or prefetch:
/// every signed request consumes exactly one nonce, fetched fresh via a
/// HEAD to `newNonce` unless the caller already harvested one from a
/// previous response's `Replay-Nonce` header.
use crate::error::{AcmeError, Result};

pub struct NonceSource {
    new_nonce_url: String,
    http_client: reqwest::Client,
}

impl NonceSource {
    pub fn new(new_nonce_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            new_nonce_url: new_nonce_url.into(),
            http_client,
        }
    }

    /// Fetch a fresh nonce via HEAD `newNonce`.
    pub async fn fetch(&self) -> Result<String> {
        let response = self
            .http_client
            .head(&self.new_nonce_url)
            .send()
            .await
            .map_err(|e| AcmeError::transport(format!("failed to fetch nonce: {}", e)))?;

        if !response.status().is_success() {
            return Err(AcmeError::transport(format!(
                "newNonce failed: HTTP {}",
                response.status()
            )));
        }

        extract_nonce_header(response.headers())
    }
}

/// Pull `Replay-Nonce` out of any ACME response's headers.
pub fn extract_nonce_header(headers: &reqwest::header::HeaderMap) -> Result<String> {
    headers
        .get("replay-nonce")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| AcmeError::transport("missing replay-nonce header".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_returns_nonce_from_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("HEAD", "/new-nonce")
            .with_status(200)
            .with_header("replay-nonce", "abc123")
            .create_async()
            .await;

        let source = NonceSource::new(format!("{}/new-nonce", server.url()), reqwest::Client::new());
        let nonce = source.fetch().await.unwrap();
        assert_eq!(nonce, "abc123");
    }

    #[tokio::test]
    async fn fetch_errors_when_header_missing() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("HEAD", "/new-nonce")
            .with_status(200)
            .create_async()
            .await;

        let source = NonceSource::new(format!("{}/new-nonce", server.url()), reqwest::Client::new());
        assert!(source.fetch().await.is_err());
    }
}
