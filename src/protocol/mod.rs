/// ACME protocol core: directory discovery, nonces, JWS transport.
pub mod directory;
pub mod jwk;
pub mod jws;
pub mod nonce;

pub use directory::{Directory, DirectoryCache, DirectoryMeta};
pub use jwk::Jwk;
pub use jws::{AcmeResponse, JwsTransport, Payload};
pub use nonce::NonceSource;
