//! Derive Ed25519 keypairs from BIP-39 mnemonics along hardened BIP-32 paths.
//!
//! The core is host-agnostic; [`wasm`] binds it for JavaScript hosts and the
//! `modulr-keys` binary exposes it on the command line.

pub mod crypto;
pub mod error;
pub mod keypair;
pub mod signing;
pub mod wasm;

pub use crypto::hd::{DerivationPath, DEFAULT_PATH, HARDENED_OFFSET};
pub use error::{KeygenError, Result};
pub use keypair::{generate_keypair, generate_keypair_json, Ed25519Box};
pub use signing::{sign_message, verify_message};

/// Result from a command, separating explanatory output from copy-paste result
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Human-readable explanation
    pub output: String,
    /// Clean JSON result for copy-pasting
    pub result: String,
}
