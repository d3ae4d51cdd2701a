/// Account key material: ECDSA P-256 keypair, canonical JWK, and ES256
/// signing for JOSE requests.
use crate::error::{AcmeError, Result};
use crate::protocol::jwk::Jwk;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::rand_core::OsRng;
use p256::elliptic_curve::sec1::ToEncodedPoint;

/// An ECDSA P-256 keypair used either as the account key (for JWS
/// signing) or as a certificate's own leaf key.
pub struct KeyMaterial {
    signing_key: SigningKey,
}

impl KeyMaterial {
    /// Generate a fresh P-256 keypair.
    pub fn generate() -> Result<Self> {
        let signing_key = SigningKey::random(&mut OsRng);
        Ok(Self { signing_key })
    }

    /// Load a keypair from a PKCS#8 PEM-encoded private key.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self> {
        let signing_key = SigningKey::from_pkcs8_pem(pem)
            .map_err(|e| AcmeError::key(format!("invalid PKCS#8 PEM key: {}", e)))?;
        Ok(Self { signing_key })
    }

    /// Serialize this key as a PKCS#8 PEM-encoded private key, for
    /// persistence via the `Store` trait.
    pub fn to_pkcs8_pem(&self) -> Result<String> {
        use p256::pkcs8::EncodePrivateKey;
        self.signing_key
            .to_pkcs8_pem(Default::default())
            .map(|s| s.to_string())
            .map_err(|e| AcmeError::key(format!("failed to encode PKCS#8 PEM: {}", e)))
    }

    /// The raw, big-endian x/y affine coordinates of the public key.
    fn public_coordinates(&self) -> (Vec<u8>, Vec<u8>) {
        let verifying_key: VerifyingKey = *self.signing_key.verifying_key();
        let point = verifying_key.to_encoded_point(false);
        let x = point.x().expect("uncompressed point always has x").to_vec();
        let y = point.y().expect("uncompressed point always has y").to_vec();
        (x, y)
    }

    /// Canonical JWK for this key's public half, per spec.md §4.1: strict
    /// ascending key order `crv`, `kty`, `x`, `y`.
    pub fn jwk(&self) -> Jwk {
        let (x, y) = self.public_coordinates();
        Jwk::ec_p256(URL_SAFE_NO_PAD.encode(x), URL_SAFE_NO_PAD.encode(y))
    }

    /// RFC 7638 thumbprint of this key's JWK.
    pub fn thumbprint(&self) -> Result<String> {
        self.jwk().thumbprint()
    }

    /// Sign `data` with ES256, producing a raw fixed 64-byte `r||s`
    /// signature (not ASN.1 DER) as JOSE requires.
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        let signature: Signature = self.signing_key.sign(data);
        signature.to_bytes().to_vec()
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_signature_is_64_bytes() {
        let key = KeyMaterial::generate().unwrap();
        let sig = key.sign(b"hello world");
        assert_eq!(sig.len(), 64);
    }

    #[test]
    fn signature_verifies_under_the_public_key() {
        use p256::ecdsa::signature::Verifier;

        let key = KeyMaterial::generate().unwrap();
        let sig_bytes = key.sign(b"protected.payload");
        let signature = Signature::from_slice(&sig_bytes).unwrap();
        assert!(key.verifying_key().verify(b"protected.payload", &signature).is_ok());
    }

    #[test]
    fn jwk_has_canonical_field_order() {
        let key = KeyMaterial::generate().unwrap();
        let jwk = key.jwk();
        let json = serde_json::to_string(&jwk).unwrap();
        let crv_pos = json.find("\"crv\"").unwrap();
        let kty_pos = json.find("\"kty\"").unwrap();
        let x_pos = json.find("\"x\"").unwrap();
        let y_pos = json.find("\"y\"").unwrap();
        assert!(crv_pos < kty_pos && kty_pos < x_pos && x_pos < y_pos);
    }

    #[test]
    fn thumbprint_is_stable_for_same_key() {
        let key = KeyMaterial::generate().unwrap();
        let t1 = key.thumbprint().unwrap();
        let t2 = key.thumbprint().unwrap();
        assert_eq!(t1, t2);
    }

    #[test]
    fn roundtrips_through_pkcs8_pem() {
        let key = KeyMaterial::generate().unwrap();
        let pem = key.to_pkcs8_pem().unwrap();
        let reloaded = KeyMaterial::from_pkcs8_pem(&pem).unwrap();
        assert_eq!(key.thumbprint().unwrap(), reloaded.thumbprint().unwrap());
    }
}
