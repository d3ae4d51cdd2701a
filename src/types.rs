/// Wire types shared across the protocol, account and order layers
use serde::{Deserialize, Serialize};

/// Identifier for domain authorization (spec.md §3)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    /// Type: "dns" (the only type this engine issues for)
    #[serde(rename = "type")]
    pub id_type: String,
    /// Value: domain name
    pub value: String,
}

impl Identifier {
    /// Create a DNS identifier
    pub fn dns(domain: impl Into<String>) -> Self {
        Self {
            id_type: "dns".to_string(),
            value: domain.into(),
        }
    }
}

/// Contact information for account registration
#[derive(Debug, Clone)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub url: Option<String>,
}

impl Contact {
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            phone: None,
            url: None,
        }
    }

    pub fn phone(phone: impl Into<String>) -> Self {
        Self {
            email: None,
            phone: Some(phone.into()),
            url: None,
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            email: None,
            phone: None,
            url: Some(url.into()),
        }
    }

    /// Convert to the `mailto:`/`tel:` URI form the ACME wire format uses
    pub fn to_uri(&self) -> String {
        if let Some(email) = &self.email {
            format!("mailto:{}", email)
        } else if let Some(phone) = &self.phone {
            format!("tel:{}", phone)
        } else if let Some(url) = &self.url {
            url.clone()
        } else {
            String::new()
        }
    }
}

/// Challenge type. Only `dns-01` is ever solved by this engine, but the
/// wire format can name any of the three, so parsing covers all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeType {
    Http01,
    Dns01,
    TlsAlpn01,
}

impl ChallengeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::Http01 => "http-01",
            ChallengeType::Dns01 => "dns-01",
            ChallengeType::TlsAlpn01 => "tls-alpn-01",
        }
    }
}

impl std::str::FromStr for ChallengeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "http-01" => Ok(ChallengeType::Http01),
            "dns-01" => Ok(ChallengeType::Dns01),
            "tls-alpn-01" => Ok(ChallengeType::TlsAlpn01),
            _ => Err(format!("unknown challenge type: {}", s)),
        }
    }
}

impl std::fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order status (spec.md §3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Ready,
    Processing,
    Valid,
    Invalid,
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "ready" => Ok(OrderStatus::Ready),
            "processing" => Ok(OrderStatus::Processing),
            "valid" => Ok(OrderStatus::Valid),
            "invalid" => Ok(OrderStatus::Invalid),
            _ => Err(format!("unknown order status: {}", s)),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Ready => "ready",
            OrderStatus::Processing => "processing",
            OrderStatus::Valid => "valid",
            OrderStatus::Invalid => "invalid",
        };
        write!(f, "{}", s)
    }
}

/// Authorization status (spec.md §3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Pending,
    Valid,
    Invalid,
    Deactivated,
    Expired,
    Revoked,
}

impl std::str::FromStr for AuthorizationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AuthorizationStatus::Pending),
            "valid" => Ok(AuthorizationStatus::Valid),
            "invalid" => Ok(AuthorizationStatus::Invalid),
            "deactivated" => Ok(AuthorizationStatus::Deactivated),
            "expired" => Ok(AuthorizationStatus::Expired),
            "revoked" => Ok(AuthorizationStatus::Revoked),
            _ => Err(format!("unknown authorization status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_dns() {
        let id = Identifier::dns("example.com");
        assert_eq!(id.id_type, "dns");
        assert_eq!(id.value, "example.com");
    }

    #[test]
    fn contact_uris() {
        assert_eq!(
            Contact::email("test@example.com").to_uri(),
            "mailto:test@example.com"
        );
        assert_eq!(Contact::phone("+1555").to_uri(), "tel:+1555");
    }

    #[test]
    fn challenge_type_roundtrip() {
        assert_eq!(ChallengeType::Dns01.as_str(), "dns-01");
        assert_eq!("dns-01".parse::<ChallengeType>().unwrap(), ChallengeType::Dns01);
        assert!("bogus-01".parse::<ChallengeType>().is_err());
    }

    #[test]
    fn order_status_roundtrip() {
        assert_eq!("ready".parse::<OrderStatus>().unwrap(), OrderStatus::Ready);
    }
}
