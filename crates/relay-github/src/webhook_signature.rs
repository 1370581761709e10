//! HMAC verification for GitHub webhook deliveries.

use anyhow::{anyhow, bail, Context, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Verifies an `X-Hub-Signature-256` header value (`sha256=<hex>`) against
/// the raw request body and the shared webhook secret.
pub fn verify_github_signature(payload: &[u8], signature: &str, secret: &str) -> Result<()> {
    let Some(digest_hex) = signature.trim().strip_prefix("sha256=") else {
        bail!("github webhook signature must use sha256=<hex> format");
    };
    let signature_bytes = decode_hex(digest_hex)?;
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .context("failed to initialize webhook HMAC verifier")?;
    mac.update(payload);
    mac.verify_slice(&signature_bytes)
        .map_err(|_| anyhow!("webhook signature verification failed"))
}

fn decode_hex(value: &str) -> Result<Vec<u8>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("signature digest cannot be empty");
    }
    if trimmed.len() % 2 != 0 {
        bail!("signature digest must have an even number of hex characters");
    }

    let raw = trimmed.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len() / 2);
    for pair in raw.chunks_exact(2) {
        let hex = std::str::from_utf8(pair).context("invalid utf-8 in signature digest")?;
        let byte = u8::from_str_radix(hex, 16)
            .with_context(|| format!("invalid hex byte '{hex}' in signature digest"))?;
        bytes.push(byte);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    use super::*;

    fn sign(payload: &[u8], secret: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        let digest = mac.finalize().into_bytes();
        let hex = digest
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<String>();
        format!("sha256={hex}")
    }

    #[test]
    fn accepts_valid_signature() {
        let payload = br#"{"action":"opened"}"#;
        let signature = sign(payload, "hook-secret");
        verify_github_signature(payload, &signature, "hook-secret").unwrap();
    }

    #[test]
    fn rejects_signature_from_wrong_secret() {
        let payload = br#"{"action":"opened"}"#;
        let signature = sign(payload, "other-secret");
        assert!(verify_github_signature(payload, &signature, "hook-secret").is_err());
    }

    #[test]
    fn rejects_signature_for_tampered_payload() {
        let signature = sign(br#"{"action":"opened"}"#, "hook-secret");
        assert!(
            verify_github_signature(br#"{"action":"closed"}"#, &signature, "hook-secret").is_err()
        );
    }

    #[test]
    fn rejects_missing_prefix_and_bad_hex() {
        assert!(verify_github_signature(b"x", "deadbeef", "s").is_err());
        assert!(verify_github_signature(b"x", "sha256=zz", "s").is_err());
        assert!(verify_github_signature(b"x", "sha256=abc", "s").is_err());
        assert!(verify_github_signature(b"x", "sha256=", "s").is_err());
    }
}
