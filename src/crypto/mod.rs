//! Cryptographic Primitives
//!
//! The three stages behind a derived keypair:
//!
//! - **mnemonic**: BIP-39 mnemonic generation, validation and seed stretching
//! - **hd**: hardened-only BIP-32 derivation along a four-tier path
//! - **ed25519**: Ed25519 key synthesis plus base58 / PKCS#8 encodings

pub mod ed25519;
pub mod hd;
pub mod mnemonic;
