/// Error handling for the ACME protocol engine
use thiserror::Error;

/// Result type for ACME operations
pub type Result<T> = std::result::Result<T, AcmeError>;

/// A single RFC 7807 sub-problem, as embedded in an ACME problem document
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AcmeSubproblem {
    #[serde(rename = "type")]
    pub problem_type: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub identifier: Option<crate::types::Identifier>,
}

/// An RFC 7807 problem document returned by the ACME server
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AcmeProblem {
    #[serde(rename = "type", default)]
    pub problem_type: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub subproblems: Option<Vec<AcmeSubproblem>>,
}

impl std::fmt::Display for AcmeProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            self.detail.as_deref().unwrap_or(&self.problem_type),
            self.status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "no status".to_string())
        )
    }
}

/// Error types for ACME operations
#[derive(Error, Debug)]
pub enum AcmeError {
    /// Request could not reach the server, or the server did not respond
    /// with a well-formed HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server responded with a non-2xx status and a parsed (or
    /// unparsed) RFC 7807 problem document.
    #[error("acme server error: {problem}")]
    AcmeServer { problem: AcmeProblem },

    /// The server's response was well-formed HTTP but violated the ACME
    /// wire protocol (missing header, bad JSON shape, unexpected status).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A cryptographic operation (key generation, signing, thumbprint)
    /// failed.
    #[error("key error: {0}")]
    Key(String),

    /// The session was asked to perform an operation its current state
    /// does not allow (e.g. finalize before the order is ready).
    #[error("state error: {0}")]
    State(String),

    /// IO error, typically from the persistence layer.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AcmeError {
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        AcmeError::Transport(msg.into())
    }

    pub fn acme_server(problem: AcmeProblem) -> Self {
        AcmeError::AcmeServer { problem }
    }

    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        AcmeError::Protocol(msg.into())
    }

    pub fn key<S: Into<String>>(msg: S) -> Self {
        AcmeError::Key(msg.into())
    }

    pub fn state<S: Into<String>>(msg: S) -> Self {
        AcmeError::State(msg.into())
    }

    /// True if the server flagged this as `urn:ietf:params:acme:error:badNonce`.
    pub fn is_bad_nonce(&self) -> bool {
        matches!(
            self,
            AcmeError::AcmeServer { problem }
                if problem.problem_type.ends_with(":badNonce")
        )
    }
}
