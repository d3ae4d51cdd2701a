/// Flattened JWS construction and the signed-request transport (spec.md §4.4)
use crate::crypto::KeyMaterial;
use crate::error::{AcmeError, AcmeProblem, Result};
use crate::protocol::nonce::{extract_nonce_header, NonceSource};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::Mutex;

/// What to put in the JWS payload.
///
/// ACME distinguishes an empty *string* payload (POST-as-GET) from an
/// explicit empty JSON *object* payload (e.g. "respond to this challenge"),
/// and the two base64url-encode differently — grounded on
/// `examples/original_source/acme.go`, where `FinalizeGet`/`NewOrderGet`
/// post `""` but `SubmitChallenge` posts `map[string]any{}`.
pub enum Payload<'a> {
    /// A POST-as-GET request: the payload is the empty string.
    PostAsGet,
    /// An explicit JSON payload, including `{}`.
    Json(&'a Value),
}

/// Result of a signed request: the deserialized body plus any `Location`
/// header the server returned (new account/new order responses carry the
/// resource URL there), and `Retry-After` parsed as whole seconds (0 if
/// absent or non-numeric, per spec.md §3/§8).
pub struct AcmeResponse<T> {
    pub body: T,
    pub location: Option<String>,
    pub retry_after: u64,
}

fn extract_retry_after(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get("retry-after")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0)
}

/// Builds and sends ACME JWS requests, handling the single-shot badNonce
/// retry spec.md §4.4 and §7 describe.
///
/// Every request consumes exactly one nonce (spec.md §4.3): either one
/// harvested from the `Replay-Nonce` header of this transport's own
/// previous response, or — on the very first request, or after a
/// badNonce retry burned the harvested one — a fresh one fetched via
/// `NonceSource::fetch`. This single slot is not a pool: it never holds
/// more than one nonce and is never prefetched ahead of need.
pub struct JwsTransport {
    http_client: reqwest::Client,
    nonce_source: NonceSource,
    harvested_nonce: Mutex<Option<String>>,
}

impl JwsTransport {
    pub fn new(http_client: reqwest::Client, nonce_source: NonceSource) -> Self {
        Self {
            http_client,
            nonce_source,
            harvested_nonce: Mutex::new(None),
        }
    }

    /// Sign and POST a request identified by JWK (used only for
    /// `newAccount`, before an account URL/`kid` exists).
    pub async fn request_with_jwk<T: DeserializeOwned>(
        &self,
        key: &KeyMaterial,
        url: &str,
        payload: Payload<'_>,
    ) -> Result<AcmeResponse<T>> {
        self.request_inner(key, None, url, payload, true).await
    }

    /// Sign and POST a request identified by `kid` (the account URL) —
    /// every request once an account exists.
    pub async fn request_with_kid<T: DeserializeOwned>(
        &self,
        key: &KeyMaterial,
        kid: &str,
        url: &str,
        payload: Payload<'_>,
    ) -> Result<AcmeResponse<T>> {
        self.request_inner(key, Some(kid), url, payload, true).await
    }

    async fn next_nonce(&self) -> Result<String> {
        if let Some(nonce) = self.harvested_nonce.lock().await.take() {
            return Ok(nonce);
        }
        self.nonce_source.fetch().await
    }

    async fn harvest(&self, response: &reqwest::Response) {
        if let Ok(nonce) = extract_nonce_header(response.headers()) {
            *self.harvested_nonce.lock().await = Some(nonce);
        }
    }

    fn request_inner<'a, T: DeserializeOwned + 'a>(
        &'a self,
        key: &'a KeyMaterial,
        kid: Option<&'a str>,
        url: &'a str,
        payload: Payload<'a>,
        allow_retry: bool,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<AcmeResponse<T>>> + 'a>> {
        Box::pin(async move {
            let nonce = self.next_nonce().await?;
            let body = build_flattened_jws(key, kid, url, &nonce, &payload)?;

            let response = self
                .http_client
                .post(url)
                .header("Content-Type", "application/jose+json")
                .body(body)
                .send()
                .await
                .map_err(|e| AcmeError::transport(format!("request to {} failed: {}", url, e)))?;

            self.harvest(&response).await;

            let status = response.status();
            let location = response
                .headers()
                .get("location")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string());
            let retry_after = extract_retry_after(response.headers());

            if !status.is_success() {
                let problem = parse_problem(response, status.as_u16()).await;
                let err = AcmeError::acme_server(problem);
                if allow_retry && err.is_bad_nonce() {
                    return self.request_inner(key, kid, url, payload, false).await;
                }
                return Err(err);
            }

            let body: T = response.json().await.map_err(|e| {
                AcmeError::protocol(format!("failed to parse response body: {}", e))
            })?;

            Ok(AcmeResponse { body, location, retry_after })
        })
    }

    /// POST-as-GET, returning the raw `reqwest::Response` so the caller
    /// can read headers like `Retry-After` (used for order polling).
    pub async fn post_as_get_raw(
        &self,
        key: &KeyMaterial,
        kid: &str,
        url: &str,
    ) -> Result<reqwest::Response> {
        let nonce = self.next_nonce().await?;
        let body = build_flattened_jws(key, Some(kid), url, &nonce, &Payload::PostAsGet)?;

        let response = self
            .http_client
            .post(url)
            .header("Content-Type", "application/jose+json")
            .body(body)
            .send()
            .await
            .map_err(|e| AcmeError::transport(format!("request to {} failed: {}", url, e)))?;

        self.harvest(&response).await;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let problem = parse_problem(response, status).await;
            return Err(AcmeError::acme_server(problem));
        }

        Ok(response)
    }
}

async fn parse_problem(response: reqwest::Response, status: u16) -> AcmeProblem {
    match response.json::<AcmeProblem>().await {
        Ok(mut problem) => {
            problem.status.get_or_insert(status);
            problem
        }
        Err(_) => AcmeProblem {
            problem_type: "about:blank".to_string(),
            detail: Some(format!(
                "server returned HTTP {} with no problem document",
                status
            )),
            status: Some(status),
            subproblems: None,
        },
    }
}

fn build_flattened_jws(
    key: &KeyMaterial,
    kid: Option<&str>,
    url: &str,
    nonce: &str,
    payload: &Payload<'_>,
) -> Result<String> {
    let mut protected = serde_json::Map::new();
    protected.insert("alg".to_string(), json!("ES256"));
    match kid {
        Some(kid) => {
            protected.insert("kid".to_string(), json!(kid));
        }
        None => {
            protected.insert("jwk".to_string(), key.jwk().to_value());
        }
    }
    protected.insert("nonce".to_string(), json!(nonce));
    protected.insert("url".to_string(), json!(url));

    let protected_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&protected)?);
    let payload_b64 = match payload {
        Payload::PostAsGet => String::new(),
        Payload::Json(value) => URL_SAFE_NO_PAD.encode(serde_json::to_vec(value)?),
    };

    let signing_input = format!("{}.{}", protected_b64, payload_b64);
    let signature = key.sign(signing_input.as_bytes());
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature);

    let flattened = FlattenedJws {
        protected: protected_b64,
        payload: payload_b64,
        signature: signature_b64,
    };

    Ok(serde_json::to_string(&flattened)?)
}

#[derive(Serialize)]
struct FlattenedJws {
    protected: String,
    payload: String,
    signature: String,
}
