//! ACME v2 (RFC 8555) dns-01 protocol engine.
//!
//! Implements directory discovery, replay-nonce handling, JOSE/JWS
//! signing, and the account/order/authorization/challenge state machine
//! needed to obtain a certificate via the dns-01 challenge. Does not
//! publish DNS records, drive a CLI menu, or pick a persistence backend —
//! those are external collaborators; `store::FileStore` is this crate's
//! one reference implementation of the persistence interface.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use acme_rfc8555::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> acme_rfc8555::Result<()> {
//!     let key = KeyMaterial::generate()?;
//!     let mut session = AcmeSession::new(
//!         "https://acme-staging-v02.api.letsencrypt.org/directory",
//!         key,
//!     );
//!     session
//!         .register_account(&[Contact::email("admin@example.com")], true)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod config;
pub mod crypto;
pub mod error;
pub mod order;
pub mod protocol;
pub mod session;
pub mod store;
pub mod types;

pub use account::Account;
pub use config::Config;
pub use crypto::KeyMaterial;
pub use error::{AcmeError, AcmeProblem, Result};
pub use order::{Authorization, Challenge, FinalizationRequest, NewOrderRequest, Order};
pub use protocol::{Directory, DirectoryCache, Jwk, JwsTransport, NonceSource};
pub use session::AcmeSession;
pub use store::{FileStore, Store};
pub use types::{AuthorizationStatus, ChallengeType, Contact, Identifier, OrderStatus};

/// Commonly used types, for `use acme_rfc8555::prelude::*;`.
pub mod prelude {
    pub use crate::{
        Account, AcmeError, AcmeSession, Authorization, Challenge, Config, Contact, Directory,
        DirectoryCache, FileStore, FinalizationRequest, Identifier, Jwk, JwsTransport,
        KeyMaterial, NewOrderRequest, NonceSource, Order, Result, Store,
        types::{AuthorizationStatus, ChallengeType, OrderStatus},
    };
}
