use mockito::Server;
use serde_json::json;

/// Mock ACME server wiring shared across the integration tests: directory,
/// nonce issuance, and the account/order/challenge endpoints exercised by a
/// dns-01 issuance flow.
pub struct MockAcmeServer {
    pub server: mockito::ServerGuard,
}

impl MockAcmeServer {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        Self { server }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    pub async fn mock_directory(&mut self) -> mockito::Mock {
        let url = self.url();
        self.server
            .mock("GET", "/directory")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "newNonce": format!("{}/new-nonce", url),
                    "newAccount": format!("{}/new-account", url),
                    "newOrder": format!("{}/new-order", url),
                    "revokeCert": format!("{}/revoke-cert", url),
                    "keyChange": format!("{}/key-change", url),
                    "meta": {
                        "termsOfService": "https://example.com/tos"
                    }
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    pub async fn mock_new_nonce(&mut self) -> mockito::Mock {
        self.server
            .mock("HEAD", "/new-nonce")
            .with_status(200)
            .with_header("replay-nonce", "test-nonce-123")
            .create_async()
            .await
    }

    pub async fn mock_new_account(&mut self) -> mockito::Mock {
        let url = self.url();
        self.server
            .mock("POST", "/new-account")
            .with_status(201)
            .with_header("location", &format!("{}/account/1", url))
            .with_header("replay-nonce", "test-nonce-124")
            .with_body(
                json!({
                    "status": "valid",
                    "contact": ["mailto:admin@example.com"],
                    "termsOfServiceAgreed": true,
                    "orders": format!("{}/account/1/orders", url)
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    pub async fn mock_new_order(&mut self, status: &str) -> mockito::Mock {
        let url = self.url();
        self.server
            .mock("POST", "/new-order")
            .with_status(201)
            .with_header("location", &format!("{}/order/1", url))
            .with_header("replay-nonce", "test-nonce-125")
            .with_body(
                json!({
                    "status": status,
                    "expires": "2030-01-01T00:00:00Z",
                    "identifiers": [{"type": "dns", "value": "example.com"}],
                    "authorizations": [format!("{}/authz/1", url)],
                    "finalize": format!("{}/order/1/finalize", url)
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    pub async fn mock_authorization(&mut self, status: &str) -> mockito::Mock {
        let url = self.url();
        self.server
            .mock("POST", "/authz/1")
            .with_status(200)
            .with_header("replay-nonce", "test-nonce-126")
            .with_body(
                json!({
                    "identifier": {"type": "dns", "value": "example.com"},
                    "status": status,
                    "expires": "2030-01-01T00:00:00Z",
                    "challenges": [{
                        "type": "dns-01",
                        "url": format!("{}/challenge/1", url),
                        "status": "pending",
                        "token": "token-abc"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    pub async fn mock_challenge_accept(&mut self) -> mockito::Mock {
        self.server
            .mock("POST", "/challenge/1")
            .with_status(200)
            .with_header("replay-nonce", "test-nonce-127")
            .with_body(json!({"type": "dns-01", "url": "unused", "status": "processing", "token": "token-abc"}).to_string())
            .create_async()
            .await
    }

    pub async fn mock_order_poll(&mut self, status: &str, certificate: Option<&str>) -> mockito::Mock {
        let mut body = json!({
            "status": status,
            "expires": "2030-01-01T00:00:00Z",
            "identifiers": [{"type": "dns", "value": "example.com"}],
            "authorizations": [format!("{}/authz/1", self.url())],
            "finalize": format!("{}/order/1/finalize", self.url())
        });
        if let Some(cert) = certificate {
            body["certificate"] = json!(cert);
        }

        self.server
            .mock("POST", "/order/1")
            .with_status(200)
            .with_header("replay-nonce", "test-nonce-128")
            .with_body(body.to_string())
            .create_async()
            .await
    }
}
