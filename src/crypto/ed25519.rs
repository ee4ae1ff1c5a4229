//! Ed25519 Keypair Synthesis and Key Encodings
//!
//! Turns the 32-byte leaf of the HD walk into an Ed25519 keypair. The leaf is
//! used directly as the RFC 8032 seed, so this step is a pure function.
//!
//! Encodings handed to the host:
//! - public key: bare 32-byte key, base58 (Bitcoin alphabet, no checksum)
//! - private key: PKCS#8 v1 `PrivateKeyInfo` (RFC 8410), standard base64
//!
//! The PKCS#8 form is the 48-byte document
//! `30 2e 02 01 00 30 05 06 03 2b 65 70 04 22 04 20 || seed`, which PEM
//! tooling (OpenSSL, Node's `crypto`) reads as an Ed25519 private key.

use crate::error::{KeygenError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::pkcs8::{DecodePrivateKey, EncodePrivateKey, KeypairBytes};
use ed25519_dalek::{SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};

/// DER prefix of an RFC 8410 Ed25519 `PrivateKeyInfo` without public key.
pub const PKCS8_ED25519_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];

/// Length of the encoded private key document.
pub const PKCS8_ED25519_LEN: usize = PKCS8_ED25519_PREFIX.len() + SECRET_KEY_LENGTH;

// ============================================================================
// Key Synthesis
// ============================================================================

/// Build the Ed25519 signing key seeded by `key_material`
///
/// Anything but 32 bytes, or an all-zero seed, is refused.
pub fn synthesize_keypair(key_material: &[u8]) -> Result<SigningKey> {
    let seed: &[u8; SECRET_KEY_LENGTH] = key_material.try_into().map_err(|_| {
        KeygenError::key_synthesis(format!(
            "expected {} bytes of key material, got {}",
            SECRET_KEY_LENGTH,
            key_material.len()
        ))
    })?;

    if seed.iter().all(|b| *b == 0) {
        return Err(KeygenError::key_synthesis("key material is all zeroes"));
    }

    Ok(SigningKey::from_bytes(seed))
}

// ============================================================================
// Encoding
// ============================================================================

/// Base58 of the bare 32-byte public key
pub fn encode_public_key(verifying_key: &VerifyingKey) -> String {
    bs58::encode(verifying_key.as_bytes()).into_string()
}

/// Base64 of the PKCS#8 v1 document carrying the signing key's seed
pub fn encode_private_key(signing_key: &SigningKey) -> Result<String> {
    let keypair_bytes = KeypairBytes {
        secret_key: signing_key.to_bytes(),
        public_key: None,
    };
    let document = keypair_bytes
        .to_pkcs8_der()
        .map_err(|e| KeygenError::key_synthesis(format!("PKCS#8 encoding failed: {}", e)))?;

    Ok(STANDARD.encode(document.as_bytes()))
}

// ============================================================================
// Decoding
// ============================================================================

/// Parse a base58 public key produced by [`encode_public_key`]
pub fn decode_public_key(encoded: &str) -> Result<VerifyingKey> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| KeygenError::invalid_key(format!("public key is not base58: {}", e)))?;

    let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
        KeygenError::invalid_key(format!(
            "public key must be {} bytes, got {}",
            PUBLIC_KEY_LENGTH,
            bytes.len()
        ))
    })?;

    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| KeygenError::invalid_key(format!("public key is not a curve point: {}", e)))
}

/// Parse a base64 PKCS#8 private key (with or without embedded public key)
pub fn decode_private_key(encoded: &str) -> Result<SigningKey> {
    let compact: String = encoded.split_whitespace().collect();
    let der = STANDARD
        .decode(compact)
        .map_err(|e| KeygenError::invalid_key(format!("private key is not base64: {}", e)))?;

    SigningKey::from_pkcs8_der(&der)
        .map_err(|e| KeygenError::invalid_key(format!("private key is not Ed25519 PKCS#8: {}", e)))
}

// ============================================================================
// Tests
// ============================================================================
