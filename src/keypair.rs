//! Mnemonic → Ed25519 keypair pipeline
//!
//! Mnemonic Provider → Seed Derivator → Keypair Synthesizer → output record.
//! Every stage returns `Result` and the first failure ends the call; a
//! partially filled record is never produced.

use crate::crypto::ed25519::{encode_private_key, encode_public_key, synthesize_keypair};
use crate::crypto::hd::{derive_path, DerivationPath};
use crate::crypto::mnemonic::{
    format_mnemonic_numbered, mnemonic_to_seed, parse_mnemonic, resolve_mnemonic,
};
use crate::error::Result;
use crate::CommandResult;
use serde::{Deserialize, Serialize};

// ============================================================================
// Data Structures
// ============================================================================

/// Result record returned to the host
///
/// Field names and order are part of the host contract:
/// `{"mnemonic":…,"bip44Path":[…],"pub":…,"prv":…}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Ed25519Box {
    /// Mnemonic used (caller's phrase normalized, or a freshly generated one)
    pub mnemonic: String,
    /// Path actually walked (the default when none was given)
    #[serde(rename = "bip44Path")]
    pub bip44_path: DerivationPath,
    /// 32-byte public key, base58
    #[serde(rename = "pub")]
    pub public_key: String,
    /// PKCS#8 private key, base64
    #[serde(rename = "prv")]
    pub private_key: String,
}

impl Ed25519Box {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Derive an Ed25519 keypair from a mnemonic
///
/// An empty `mnemonic` generates a fresh 24-word one. `path` of `None` walks
/// the default `m/44'/7337'/0'/0'`. For a given (mnemonic, passphrase, path)
/// the result is always identical.
pub fn generate_keypair(
    mnemonic: &str,
    passphrase: &str,
    path: Option<DerivationPath>,
) -> Result<Ed25519Box> {
    let path = path.unwrap_or_default();
    tracing::debug!(path = %path, generate = mnemonic.is_empty(), "Deriving Ed25519 keypair");

    let (phrase, mnemonic) = resolve_mnemonic(mnemonic)?;
    let seed = mnemonic_to_seed(&mnemonic, passphrase);
    let leaf = derive_path(seed.as_slice(), &path)?;
    let signing_key = synthesize_keypair(leaf.key())?;

    let record = Ed25519Box {
        mnemonic: phrase,
        bip44_path: path,
        public_key: encode_public_key(&signing_key.verifying_key()),
        private_key: encode_private_key(&signing_key)?,
    };
    tracing::debug!(public_key = %record.public_key, "Keypair ready");
    Ok(record)
}

/// [`generate_keypair`] serialized to the host JSON string
pub fn generate_keypair_json(
    mnemonic: &str,
    passphrase: &str,
    path: Option<DerivationPath>,
) -> Result<String> {
    generate_keypair(mnemonic, passphrase, path)?.to_json()
}

// ============================================================================
// CLI Output
// ============================================================================

/// Run the pipeline and explain what happened, for the CLI
pub fn generate_keypair_core(
    mnemonic: &str,
    passphrase: &str,
    path: Option<DerivationPath>,
) -> Result<CommandResult> {
    let generated = mnemonic.is_empty();
    let record = generate_keypair(mnemonic, passphrase, path)?;
    let mut out = String::new();

    out.push_str("Ed25519 Key Derivation (BIP-39 + hardened BIP-32)\n\n");
    if generated {
        out.push_str("Generated a new 24-word mnemonic (256-bit entropy).\n");
        out.push_str("Write it down, it is the only backup of this key:\n\n");
        let parsed = parse_mnemonic(&record.mnemonic)?;
        out.push_str(&format_mnemonic_numbered(&parsed));
        out.push_str("\n\n");
    } else {
        out.push_str("Using the supplied mnemonic.\n");
    }
    if !passphrase.is_empty() {
        out.push_str("Passphrase applied to the seed.\n");
    }
    out.push_str(&format!("Derivation path: {}\n", record.bip44_path));
    out.push_str(&format!("Public key (base58): {}\n", record.public_key));

    Ok(CommandResult {
        output: out,
        result: record.to_json()?,
    })
}

// ============================================================================
// Tests
// ============================================================================
