//! Ed25519 message signing with the keys produced by [`crate::keypair`]
//!
//! Takes the same encodings the keypair record hands out: a base64 PKCS#8
//! private key to sign and a base58 public key to verify. Signatures travel
//! as standard base64 of the 64 raw bytes.

use crate::crypto::ed25519::{decode_private_key, decode_public_key, encode_public_key};
use crate::error::{KeygenError, Result};
use crate::CommandResult;
use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::{Signature, Signer, Verifier, SIGNATURE_LENGTH};
use serde::{Deserialize, Serialize};

/// Output from signing
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignatureOutput {
    /// 64-byte Ed25519 signature (base64)
    pub signature: String,
    /// Signer's public key (base58)
    #[serde(rename = "pub")]
    pub public_key: String,
}

/// Output from verification
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VerifyOutput {
    pub valid: bool,
}

// ============================================================================
// Sign / Verify
// ============================================================================

/// Sign `message` with a base64 PKCS#8 Ed25519 private key
pub fn sign_message(message: &[u8], private_key: &str) -> Result<String> {
    let signing_key = decode_private_key(private_key)?;
    let signature = signing_key.sign(message);
    Ok(STANDARD.encode(signature.to_bytes()))
}

/// Verify a base64 signature over `message` against a base58 public key
///
/// Malformed inputs are errors here; a well-formed signature that does not
/// match returns `Ok(false)`. The host binding folds both into `false`.
pub fn verify_message(message: &[u8], signature: &str, public_key: &str) -> Result<bool> {
    let verifying_key = decode_public_key(public_key)?;

    let bytes = STANDARD
        .decode(signature.trim())
        .map_err(|e| KeygenError::InvalidSignature(format!("not base64: {}", e)))?;
    let bytes: [u8; SIGNATURE_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
        KeygenError::InvalidSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LENGTH,
            bytes.len()
        ))
    })?;
    let signature = Signature::from_bytes(&bytes);

    let valid = verifying_key.verify(message, &signature).is_ok();
    tracing::debug!(valid, "Verified Ed25519 signature");
    Ok(valid)
}

// ============================================================================
// CLI Output
// ============================================================================

pub fn sign_message_core(message: &str, private_key: &str) -> Result<CommandResult> {
    let signature = sign_message(message.as_bytes(), private_key)?;
    let public_key = encode_public_key(&decode_private_key(private_key)?.verifying_key());

    let out = format!(
        "Ed25519 Signature\n\nMessage: {}\nSigner (base58): {}\n",
        message, public_key
    );
    let result = serde_json::to_string(&SignatureOutput {
        signature,
        public_key,
    })?;

    Ok(CommandResult {
        output: out,
        result,
    })
}

pub fn verify_message_core(message: &str, signature: &str, public_key: &str) -> Result<CommandResult> {
    let valid = verify_message(message.as_bytes(), signature, public_key)?;

    let out = if valid {
        "Signature is VALID\n".to_string()
    } else {
        "Signature is INVALID\n".to_string()
    };

    Ok(CommandResult {
        output: out,
        result: serde_json::to_string(&VerifyOutput { valid })?,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PRV: &str = "MC4CAQAwBQYDK2VwBCIEIAT+/0JjZYRZQwrqM8uFG4MKAjXbFhHTJ5Yk9Ax8LAE1";
    const PUB: &str = "9kzzwQ4y3iW6A9xPCh7cv2H6KGxmNLKrH55jd7hkpfGF";

    #[test]
    fn test_signature_vector() {
        // Ed25519 signing is deterministic
        let sig = sign_message(b"modulr", PRV).unwrap();
        assert_eq!(
            sig,
            "nNGSmu0HYLeefmXFk6YP+BOioT3HHMs16In8cpjjbfuaD1A2wV9fcBoTDC7O8y3u66lVQdWtBEK8aQ8q3ZlxCA=="
        );
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let sig = sign_message(b"hello", PRV).unwrap();
        assert!(verify_message(b"hello", &sig, PUB).unwrap());
        assert!(!verify_message(b"hellp", &sig, PUB).unwrap());
    }

    #[test]
    fn test_wrong_public_key_fails() {
        let sig = sign_message(b"hello", PRV).unwrap();
        let other = "ASJWgwQuLJtP6tDvkfFNR3eyK7rmDyRefHhoP7BLwzAt";
        assert!(!verify_message(b"hello", &sig, other).unwrap());
    }

    #[test]
    fn test_malformed_signature_is_error() {
        // library-level detail; the wasm binding reports these as false
        let err = verify_message(b"hello", "AAAA", PUB).unwrap_err();
        assert_eq!(err.tag(), "InvalidSignature");
        assert!(verify_message(b"hello", "***", PUB).is_err());
    }

    #[test]
    fn test_sign_core_reports_signer() {
        let result = sign_message_core("modulr", PRV).unwrap();
        let parsed: SignatureOutput = serde_json::from_str(&result.result).unwrap();
        assert_eq!(parsed.public_key, PUB);
        assert!(result.output.contains(PUB));
    }

    #[test]
    fn test_verify_core() {
        let sig = sign_message(b"modulr", PRV).unwrap();
        let result = verify_message_core("modulr", &sig, PUB).unwrap();
        assert_eq!(result.result, "{\"valid\":true}");
    }
}
