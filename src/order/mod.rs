/// Order, authorization and challenge data types (spec.md §3)
pub mod csr;

use crate::types::{AuthorizationStatus, Identifier, OrderStatus};
use serde::{Deserialize, Serialize};

pub use csr::{generate_csr, parse_certificate_chain, verify_certificate_domains};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    #[serde(rename = "type")]
    pub challenge_type: String,

    pub url: String,

    pub status: String,

    pub token: String,

    #[serde(default)]
    pub validated: Option<String>,

    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authorization {
    pub identifier: Identifier,

    pub status: String,

    pub expires: Option<String>,

    pub challenges: Vec<Challenge>,

    #[serde(default)]
    pub wildcard: Option<bool>,
}

impl Authorization {
    pub fn get_challenge(&self, challenge_type: &str) -> Option<&Challenge> {
        self.challenges
            .iter()
            .find(|c| c.challenge_type == challenge_type)
    }

    pub fn status_enum(&self) -> Option<AuthorizationStatus> {
        self.status.parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub status: String,

    pub expires: Option<String>,

    pub identifiers: Vec<Identifier>,

    pub authorizations: Vec<String>,

    pub finalize: String,

    #[serde(default)]
    pub certificate: Option<String>,

    /// Seconds from the response's `Retry-After` header, 0 if absent or
    /// non-numeric. Not part of the ACME wire body — populated by
    /// `AcmeSession` from the HTTP response that produced this `Order`.
    #[serde(default, skip_serializing)]
    pub retry_after: u64,

    /// The order's own URL (not part of the ACME wire body — ACME servers
    /// never echo it back in the JSON, only via the `Location` header).
    /// Populated by `AcmeSession` from that header, and kept serialized so
    /// `Store` implementations can recover it on reload.
    #[serde(default)]
    pub uri: String,
}

impl Order {
    pub fn status_enum(&self) -> Option<OrderStatus> {
        self.status.parse().ok()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status_enum(), Some(OrderStatus::Ready))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.status_enum(), Some(OrderStatus::Valid))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status_enum(), Some(OrderStatus::Pending))
    }
}

/// Body of a `newOrder` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub identifiers: Vec<Identifier>,
}

impl NewOrderRequest {
    pub fn new(domains: &[String]) -> Self {
        Self {
            identifiers: domains.iter().map(Identifier::dns).collect(),
        }
    }
}

/// Body of a `finalize` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizationRequest {
    pub csr: String,
}
