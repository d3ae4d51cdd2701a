/// Account resource and account-lifecycle data types (spec.md §3, §4.5)
use serde::{Deserialize, Serialize};

/// Account information as returned by the ACME server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Account URL, used as the JWS `kid` for all subsequent requests.
    /// Populated from the `Location` response header, not the body.
    #[serde(default)]
    pub url: String,

    pub status: String,

    #[serde(default)]
    pub contact: Vec<String>,

    #[serde(rename = "termsOfServiceAgreed", default)]
    pub terms_of_service_agreed: bool,

    #[serde(default)]
    pub orders: Option<String>,

    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,

    #[serde(rename = "initialIp", default)]
    pub initial_ip: Option<String>,
}

impl Account {
    pub fn is_valid(&self) -> bool {
        self.status == "valid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_account_body() {
        let json = r#"{
            "status": "valid",
            "contact": ["mailto:admin@example.com"],
            "termsOfServiceAgreed": true,
            "orders": "https://example.com/acme/acct/1/orders"
        }"#;

        let account: Account = serde_json::from_str(json).unwrap();
        assert!(account.is_valid());
        assert_eq!(account.contact.len(), 1);
    }
}
