/// CSR construction, and certificate-chain parsing/verification for the
/// `finalize`/`downloadCertificate` steps (spec.md §4.5).
///
/// Rewritten against the modern rcgen API (`CertificateParams::new`
/// returning a `Result`, `serialize_request`) — grounded on
/// `examples/other_examples/28047440_n0-computer-tokio-rustls-acme__src-acme.rs.rs`,
/// since the rcgen 0.14 declared in this crate's own Cargo.toml dropped
/// the older `Certificate::from_params`/`serialize_request_der` API this
/// module previously called.
use crate::error::{AcmeError, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair as RcgenKeyPair, PKCS_ECDSA_P256_SHA256};

/// Generate a fresh P-256 leaf key and a CSR for `domains`.
///
/// Returns `(csr_der_base64url, private_key_pem)`. The base64url form is
/// what the `finalize` request body's `csr` field wants directly. The
/// Subject's CommonName is set to the first domain, per spec.md §4.5.
pub fn generate_csr(domains: &[String]) -> Result<(String, String)> {
    let key_pair = RcgenKeyPair::generate_for(&PKCS_ECDSA_P256_SHA256)
        .map_err(|e| AcmeError::key(format!("failed to generate leaf key: {}", e)))?;

    let mut params = CertificateParams::new(domains.to_vec())
        .map_err(|e| AcmeError::key(format!("invalid domain name in CSR: {}", e)))?;

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, domains[0].clone());
    params.distinguished_name = dn;

    let csr = params
        .serialize_request(&key_pair)
        .map_err(|e| AcmeError::key(format!("failed to serialize CSR: {}", e)))?;

    let csr_b64 = URL_SAFE_NO_PAD.encode(csr.der());
    let private_key_pem = key_pair.serialize_pem();

    Ok((csr_b64, private_key_pem))
}

/// Split a PEM certificate chain (leaf followed by intermediates) into DER
/// bytes per certificate.
pub fn parse_certificate_chain(pem: &str) -> Result<Vec<Vec<u8>>> {
    let certs: Vec<Vec<u8>> = pem::parse_many(pem.as_bytes())
        .map_err(|e| AcmeError::protocol(format!("failed to parse certificate PEM: {}", e)))?
        .into_iter()
        .filter(|item| item.tag() == "CERTIFICATE")
        .map(|item| item.contents().to_vec())
        .collect();

    if certs.is_empty() {
        return Err(AcmeError::protocol(
            "no certificates found in downloaded PEM".to_string(),
        ));
    }

    Ok(certs)
}

/// Confirm the leaf certificate's SANs cover every domain the order named.
pub fn verify_certificate_domains(leaf_der: &[u8], expected_domains: &[String]) -> Result<bool> {
    use x509_parser::prelude::*;

    let (_, cert) = X509Certificate::from_der(leaf_der)
        .map_err(|e| AcmeError::protocol(format!("failed to parse leaf certificate: {}", e)))?;

    let san_names: Vec<String> = cert
        .subject_alternative_name()
        .ok()
        .flatten()
        .map(|ext| {
            ext.value
                .general_names
                .iter()
                .filter_map(|name| match name {
                    GeneralName::DNSName(dns) => Some(dns.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    for expected in expected_domains {
        if !san_names.iter().any(|san| san == expected) {
            return Ok(false);
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_csr_returns_nonempty_der_and_pem_key() {
        let (csr_b64, key_pem) = generate_csr(&["example.com".to_string()]).unwrap();
        assert!(!csr_b64.is_empty());
        assert!(key_pem.contains("PRIVATE KEY"));
    }

    #[test]
    fn generate_csr_handles_multiple_domains() {
        let (csr_b64, _) = generate_csr(&[
            "example.com".to_string(),
            "www.example.com".to_string(),
        ])
        .unwrap();
        assert!(!csr_b64.is_empty());
    }

    #[test]
    fn parse_certificate_chain_rejects_empty_pem() {
        assert!(parse_certificate_chain("").is_err());
    }
}
