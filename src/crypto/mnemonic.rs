//! BIP-39 Mnemonic Provider and Seed Stretching
//!
//! Supplies the mnemonic a keypair is derived from and stretches it into the
//! 64-byte BIP-39 seed.
//!
//! - An empty phrase asks for a fresh 24-word mnemonic (256 bits of OS entropy).
//! - A non-empty phrase must parse against the English wordlist, checksum
//!   included. Wrong word counts, unknown words and bad checksums are rejected.
//!
//! ## Usage
//!
//! ```ignore
//! let (phrase, mnemonic) = resolve_mnemonic("")?;
//! let seed = mnemonic_to_seed(&mnemonic, "optional passphrase");
//! ```

use crate::error::{KeygenError, Result};
use bip39::{Language, Mnemonic};
use zeroize::{Zeroize, Zeroizing};

/// Entropy size of generated mnemonics (256 bits, 24 words).
pub const GENERATED_ENTROPY_BYTES: usize = 32;

/// Word count of generated mnemonics.
pub const GENERATED_WORD_COUNT: usize = 24;

// ============================================================================
// Mnemonic Generation
// ============================================================================

/// Generate a new random 24-word BIP-39 mnemonic
///
/// Entropy comes straight from the OS CSPRNG (`crypto.getRandomValues` in the
/// browser) and is zeroized once encoded. A failing source is fatal.
pub fn generate_mnemonic() -> Result<Mnemonic> {
    generate_mnemonic_with(getrandom::getrandom)
}

/// [`generate_mnemonic`] over an arbitrary entropy source
pub(crate) fn generate_mnemonic_with<F>(fill: F) -> Result<Mnemonic>
where
    F: FnOnce(&mut [u8]) -> std::result::Result<(), getrandom::Error>,
{
    let mut entropy = [0u8; GENERATED_ENTROPY_BYTES];
    if let Err(e) = fill(&mut entropy) {
        return Err(KeygenError::EntropyFailure(e.to_string()));
    }
    let result = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| KeygenError::EntropyFailure(format!("cannot encode entropy: {}", e)));
    entropy.zeroize();

    if result.is_ok() {
        tracing::info!("Generated fresh {}-word mnemonic", GENERATED_WORD_COUNT);
    }
    result
}

// ============================================================================
// Parsing & Validation
// ============================================================================

/// Parse mnemonic from space-separated words, checksum included
pub fn parse_mnemonic(words: &str) -> Result<Mnemonic> {
    if words.split_whitespace().next().is_none() {
        return Err(KeygenError::invalid_mnemonic("mnemonic contains no words"));
    }
    Mnemonic::parse_in(Language::English, words)
        .map_err(|e| KeygenError::invalid_mnemonic(e.to_string()))
}

/// Validate mnemonic words (checksum and wordlist)
pub fn validate_mnemonic(words: &str) -> bool {
    parse_mnemonic(words).is_ok()
}

/// Mnemonic Provider: pass a caller phrase through, or generate one when empty
///
/// Returns the phrase to echo back to the caller together with the parsed
/// mnemonic. A supplied phrase is echoed in its normalized form (single
/// spaces, no padding), the same text the seed is stretched from.
pub fn resolve_mnemonic(words: &str) -> Result<(String, Mnemonic)> {
    if words.is_empty() {
        let mnemonic = generate_mnemonic()?;
        return Ok((mnemonic.to_string(), mnemonic));
    }

    let mnemonic = parse_mnemonic(words)?;
    tracing::debug!(
        word_count = mnemonic.word_count(),
        "Using caller-supplied mnemonic"
    );
    Ok((mnemonic.to_string(), mnemonic))
}

// ============================================================================
// BIP-39 Seed Derivation
// ============================================================================

/// Convert mnemonic to 512-bit seed using BIP-39 PBKDF2
///
/// PBKDF2-HMAC-SHA512, 2048 rounds, salt `"mnemonic" || passphrase`.
/// An empty passphrase is allowed.
pub fn mnemonic_to_seed(mnemonic: &Mnemonic, passphrase: &str) -> Zeroizing<[u8; 64]> {
    Zeroizing::new(mnemonic.to_seed(passphrase))
}

// ============================================================================
// Display Helpers
// ============================================================================

/// Format mnemonic as numbered word list for display
pub fn format_mnemonic_numbered(mnemonic: &Mnemonic) -> String {
    mnemonic
        .words()
        .enumerate()
        .map(|(i, word)| format!("{:2}. {}", i + 1, word))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Tests
// ============================================================================
