/// JSON Web Key representation for ACME account keys (spec.md §4.1)
///
/// Only EC/P-256 keys are represented here — this engine never signs with
/// RSA or EdDSA. Field order is fixed and ascending (`crv`, `kty`, `x`,
/// `y`) because both the JWS protected header's `jwk` member and the RFC
/// 7638 thumbprint require a byte-for-byte canonical serialization.
use crate::error::Result;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jwk {
    pub crv: String,
    pub kty: String,
    pub x: String,
    pub y: String,
}

impl Jwk {
    /// Build an EC P-256 JWK from base64url-encoded x/y coordinates.
    pub fn ec_p256(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            crv: "P-256".to_string(),
            kty: "EC".to_string(),
            x: x.into(),
            y: y.into(),
        }
    }

    /// RFC 7638 thumbprint: base64url(SHA-256(canonical JSON)).
    ///
    /// Because the struct fields are already declared in ascending order
    /// and `serde_json` serializes structs in field-declaration order,
    /// `serde_json::to_string` already produces the canonical form —
    /// no manual key-sorting is needed.
    pub fn thumbprint(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(hasher.finalize()))
    }

    /// This JWK as a `serde_json::Value`, for embedding in a JWS protected
    /// header.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("Jwk always serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_serialization_is_ascending() {
        let jwk = Jwk::ec_p256("xxxx", "yyyy");
        let json = serde_json::to_string(&jwk).unwrap();
        assert_eq!(json, r#"{"crv":"P-256","kty":"EC","x":"xxxx","y":"yyyy"}"#);
    }

    #[test]
    fn thumbprint_is_deterministic() {
        let jwk = Jwk::ec_p256(
            "WKn-ZIGevcwGIyyrzFoZNBdaq9_TsqzGl96oc0CWuis",
            "y8lrnvOohSs2gksT69r56Fq3MZ_yCjL8MyCvD94PoWU",
        );
        let t1 = jwk.thumbprint().unwrap();
        let t2 = jwk.thumbprint().unwrap();
        assert_eq!(t1, t2);
        assert!(t1.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_'));
    }
}
