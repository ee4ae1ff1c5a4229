use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeygenError>;

/// Errors surfaced by the keypair pipeline and the signing helpers.
///
/// Every stage forwards the first error it hits. The host sees the variant
/// through [`KeygenError::tag`], which is stable across releases.
#[derive(Error, Debug)]
pub enum KeygenError {
    #[error("secure random source unavailable: {0}")]
    EntropyFailure(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    #[error("hardened derivation failed at tier {tier} (index {index:#x}): {reason}")]
    DerivationFailure {
        tier: usize,
        index: u32,
        reason: String,
    },

    #[error("ed25519 key synthesis failed: {0}")]
    KeySynthesisFailure(String),

    #[error("failed to encode result: {0}")]
    EncodingFailure(#[from] serde_json::Error),

    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

impl KeygenError {
    pub fn invalid_mnemonic(msg: impl Into<String>) -> Self {
        Self::InvalidMnemonic(msg.into())
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidDerivationPath(msg.into())
    }

    pub fn key_synthesis(msg: impl Into<String>) -> Self {
        Self::KeySynthesisFailure(msg.into())
    }

    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKeyEncoding(msg.into())
    }

    /// Stable name of the variant, used as the `error` field at the wasm boundary.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::EntropyFailure(_) => "EntropyFailure",
            Self::InvalidMnemonic(_) => "InvalidMnemonic",
            Self::InvalidDerivationPath(_) => "InvalidDerivationPath",
            Self::DerivationFailure { .. } => "DerivationFailure",
            Self::KeySynthesisFailure(_) => "KeySynthesisFailure",
            Self::EncodingFailure(_) => "EncodingFailure",
            Self::InvalidKeyEncoding(_) => "InvalidKeyEncoding",
            Self::InvalidSignature(_) => "InvalidSignature",
        }
    }

    /// Tagged error object handed back to the JS host.
    pub fn to_json(&self) -> String {
        #[derive(Serialize)]
        struct ErrorBox<'a> {
            error: &'a str,
            message: String,
        }

        let payload = ErrorBox {
            error: self.tag(),
            message: self.to_string(),
        };
        // Two plain strings always serialize; fall back to the tag alone.
        serde_json::to_string(&payload)
            .unwrap_or_else(|_| format!("{{\"error\":\"{}\"}}", self.tag()))
    }
}
