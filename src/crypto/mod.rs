//! Cryptographic primitives: account/leaf key generation, JWK export, ES256 signing.

pub mod key_material;

pub use key_material::KeyMaterial;
