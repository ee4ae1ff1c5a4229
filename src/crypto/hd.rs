//! BIP-32 Hardened Key Derivation
//!
//! Walks a fixed four-tier path from a BIP-39 seed down to the 32 bytes that
//! seed the Ed25519 keypair. The tree is the ordinary secp256k1 BIP-32 tree
//! (master key from `HMAC-SHA512("Bitcoin seed", seed)`), so the leaf matches
//! any BIP-32 wallet at the same path.
//!
//! ## Key Insight
//!
//! Only hardened children are ever computed:
//!
//! `IL || IR = HMAC-SHA512(chain_code, 0x00 || parent_key || ser32(2^31 + i))`
//! `child_key = (IL + parent_key) mod n`, `child_chain_code = IR`
//!
//! A leaked child key together with its chain code therefore never exposes
//! siblings or the parent.
//!
//! ## Usage
//!
//! ```ignore
//! let path = DerivationPath::default(); // m/44'/7337'/0'/0'
//! let leaf = derive_path(&seed, &path)?;
//! let ed25519_seed = leaf.key();
//! ```

use crate::error::{KeygenError, Result};
use bitcoin::secp256k1::{Scalar, SecretKey};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// First hardened child index (2^31).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Number of tiers in every derivation path.
pub const PATH_TIERS: usize = 4;

/// Default path components: purpose 44, coin type 7337, account 0, chain 0.
///
/// 7337 is this project's own coin type, not a registered SLIP-44 entry.
pub const DEFAULT_PATH: [u32; PATH_TIERS] = [44, 7337, 0, 0];

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

// ============================================================================
// Data Structures
// ============================================================================

/// Four hardened path components, stored without the hardened offset
///
/// Serializes as a plain JSON array, e.g. `[44,7337,0,0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "[u32; 4]")]
pub struct DerivationPath([u32; PATH_TIERS]);

impl DerivationPath {
    /// Build a path, rejecting components that would overflow the hardened range
    pub fn new(components: [u32; PATH_TIERS]) -> Result<Self> {
        if let Some((tier, c)) = components
            .iter()
            .enumerate()
            .find(|(_, c)| **c >= HARDENED_OFFSET)
        {
            return Err(KeygenError::invalid_path(format!(
                "component {} at tier {} must be below 2^31",
                c,
                tier + 1
            )));
        }
        Ok(Self(components))
    }

    /// Resolve four possibly-absent components from the host
    ///
    /// All absent selects the default path. All present is taken as given,
    /// including an explicit `[0, 0, 0, 0]`. Any mix is rejected.
    pub fn from_optional(components: [Option<u32>; PATH_TIERS]) -> Result<Self> {
        match components {
            [None, None, None, None] => Ok(Self::default()),
            [Some(a), Some(b), Some(c), Some(d)] => Self::new([a, b, c, d]),
            _ => Err(KeygenError::invalid_path(
                "either pass all four path components or none",
            )),
        }
    }

    /// The raw (unhardened) components
    pub fn components(&self) -> [u32; PATH_TIERS] {
        self.0
    }

    /// Child indices actually fed to BIP-32, offset into the hardened range
    pub fn hardened_indices(&self) -> [u32; PATH_TIERS] {
        // new() guarantees every component is below HARDENED_OFFSET
        self.0.map(|c| c | HARDENED_OFFSET)
    }
}

impl Default for DerivationPath {
    fn default() -> Self {
        Self(DEFAULT_PATH)
    }
}

impl TryFrom<&[u32]> for DerivationPath {
    type Error = KeygenError;

    fn try_from(components: &[u32]) -> Result<Self> {
        let components: [u32; PATH_TIERS] = components.try_into().map_err(|_| {
            KeygenError::invalid_path(format!(
                "expected {} components, got {}",
                PATH_TIERS,
                components.len()
            ))
        })?;
        Self::new(components)
    }
}

impl TryFrom<Vec<u32>> for DerivationPath {
    type Error = KeygenError;

    fn try_from(components: Vec<u32>) -> Result<Self> {
        Self::try_from(components.as_slice())
    }
}

impl From<DerivationPath> for [u32; PATH_TIERS] {
    fn from(path: DerivationPath) -> Self {
        path.0
    }
}

/// Accepts `44,7337,0,0` as well as `m/44'/7337'/0'/0'` (or `h` markers)
impl FromStr for DerivationPath {
    type Err = KeygenError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("m/")
            .or_else(|| trimmed.strip_prefix("M/"))
            .unwrap_or(trimmed);

        let components = body
            .split(|c: char| c == '/' || c == ',')
            .map(|part| {
                let part = part.trim();
                let digits = part.trim_end_matches(|c: char| c == '\'' || c == 'h' || c == 'H');
                digits.parse::<u32>().map_err(|_| {
                    KeygenError::invalid_path(format!("invalid component '{}' in '{}'", part, s))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::try_from(components)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for c in &self.0 {
            write!(f, "/{}'", c)?;
        }
        Ok(())
    }
}

/// One private node of the derivation tree
///
/// Key and chain code are wiped when the node is dropped, which happens as
/// soon as its child has been computed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ExtendedKey {
    depth: u8,
    key: [u8; 32],
    chain_code: [u8; 32],
}

impl ExtendedKey {
    /// Depth in the tree (0 for the master key)
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Raw 32-byte secp256k1 secret
    pub fn key(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("depth", &self.depth)
            .field("key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Core Derivation Functions
// ============================================================================

fn hmac_sha512(key: &[u8], data: &[&[u8]]) -> Option<Zeroizing<[u8; 64]>> {
    let mut mac = Hmac::<Sha512>::new_from_slice(key).ok()?;
    for part in data {
        mac.update(part);
    }
    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Some(out)
}

/// Split `I` into `IL` (key material) and `IR` (chain code)
fn split_halves(i: &[u8; 64]) -> (Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>) {
    let mut il = Zeroizing::new([0u8; 32]);
    let mut ir = Zeroizing::new([0u8; 32]);
    il.copy_from_slice(&i[..32]);
    ir.copy_from_slice(&i[32..]);
    (il, ir)
}

/// Derive the BIP-32 master node from a BIP-39 seed
///
/// `IL || IR = HMAC-SHA512("Bitcoin seed", seed)`. Fails if `IL` is zero or
/// not below the secp256k1 order.
pub fn master_key(seed: &[u8]) -> Result<ExtendedKey> {
    let failure = |reason: &str| KeygenError::DerivationFailure {
        tier: 0,
        index: 0,
        reason: reason.to_string(),
    };

    let i = hmac_sha512(MASTER_HMAC_KEY, &[seed]).ok_or_else(|| failure("HMAC setup failed"))?;
    let (key, chain_code) = split_halves(&i);

    SecretKey::from_slice(key.as_slice())
        .map_err(|_| failure("master key is not a valid secp256k1 scalar"))?;

    Ok(ExtendedKey {
        depth: 0,
        key: *key,
        chain_code: *chain_code,
    })
}

/// Compute the hardened child of `parent` at `index`
///
/// `index` must already include the hardened offset. Non-hardened indices are
/// refused rather than silently derived.
pub fn derive_hardened_child(parent: &ExtendedKey, index: u32) -> Result<ExtendedKey> {
    let tier = usize::from(parent.depth) + 1;
    let failure = |reason: String| KeygenError::DerivationFailure {
        tier,
        index,
        reason,
    };

    if index < HARDENED_OFFSET {
        return Err(failure("non-hardened derivation is not supported".into()));
    }

    let parent_key = SecretKey::from_slice(&parent.key)
        .map_err(|e| failure(format!("corrupted parent key: {}", e)))?;

    // Hardened: 0x00 || ser256(k_par) || ser32(i)
    let i = hmac_sha512(
        &parent.chain_code,
        &[&[0x00u8][..], &parent.key[..], &index.to_be_bytes()[..]],
    )
    .ok_or_else(|| failure("HMAC setup failed".into()))?;
    let (il, chain_code) = split_halves(&i);

    let tweak = Scalar::from_be_bytes(*il)
        .map_err(|_| failure("IL is not below the curve order".into()))?;
    let child = parent_key
        .add_tweak(&tweak)
        .map_err(|e| failure(format!("child key is invalid: {}", e)))?;

    Ok(ExtendedKey {
        depth: parent.depth.saturating_add(1),
        key: child.secret_bytes(),
        chain_code: *chain_code,
    })
}

/// Derive the leaf node at `path` from a BIP-39 seed
pub fn derive_path(seed: &[u8], path: &DerivationPath) -> Result<ExtendedKey> {
    let mut node = master_key(seed)?;
    for index in path.hardened_indices() {
        node = derive_hardened_child(&node, index)?;
    }
    tracing::debug!(path = %path, depth = node.depth, "Derived leaf key");
    Ok(node)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::mnemonic::{mnemonic_to_seed, parse_mnemonic};

    const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn abandon_seed() -> Zeroizing<[u8; 64]> {
        mnemonic_to_seed(&parse_mnemonic(ABANDON_ABOUT).unwrap(), "")
    }

    #[test]
    fn test_master_key_vector() {
        let master = master_key(abandon_seed().as_slice()).unwrap();
        assert_eq!(master.depth(), 0);
        assert_eq!(
            hex::encode(master.key()),
            "1837c1be8e2995ec11cda2b066151be2cfb48adf9e47b151d46adab3a21cdf67"
        );
    }

    #[test]
    fn test_zero_path_leaf_vector() {
        let path = DerivationPath::new([0, 0, 0, 0]).unwrap();
        let leaf = derive_path(abandon_seed().as_slice(), &path).unwrap();
        assert_eq!(leaf.depth(), 4);
        assert_eq!(
            hex::encode(leaf.key()),
            "04feff4263658459430aea33cb851b830a0235db1611d3279624f40c7c2c0135"
        );
    }

    #[test]
    fn test_default_path_leaf_vector() {
        let leaf = derive_path(abandon_seed().as_slice(), &DerivationPath::default()).unwrap();
        assert_eq!(
            hex::encode(leaf.key()),
            "e18feea7df934a92e3991926c4253e40088a7aaf0c578169e6f6b73e41c5803a"
        );
    }

    #[test]
    fn test_matches_bitcoin_bip32() {
        use bitcoin::bip32::{ChildNumber, Xpriv};
        use bitcoin::secp256k1::Secp256k1;
        use bitcoin::NetworkKind;

        let seed = abandon_seed();
        let path = DerivationPath::new([44, 7337, 3, 9]).unwrap();

        let secp = Secp256k1::new();
        let children: Vec<ChildNumber> = path
            .components()
            .iter()
            .map(|c| ChildNumber::from_hardened_idx(*c).unwrap())
            .collect();
        let expected = Xpriv::new_master(NetworkKind::Main, seed.as_slice())
            .unwrap()
            .derive_priv(&secp, &children)
            .unwrap();

        let leaf = derive_path(seed.as_slice(), &path).unwrap();
        assert_eq!(leaf.key(), &expected.private_key.secret_bytes());
    }

    #[test]
    fn test_non_hardened_derivation_rejected() {
        let master = master_key(abandon_seed().as_slice()).unwrap();

        let err = derive_hardened_child(&master, 44).unwrap_err();
        assert!(matches!(
            err,
            KeygenError::DerivationFailure { tier: 1, index: 44, .. }
        ));
        assert!(derive_hardened_child(&master, HARDENED_OFFSET - 1).is_err());
        assert!(derive_hardened_child(&master, HARDENED_OFFSET).is_ok());
    }

    #[test]
    fn test_corrupted_parent_key_names_tier() {
        // 0xff..ff is above the secp256k1 order, so it is not a valid secret
        let parent = ExtendedKey {
            depth: 2,
            key: [0xff; 32],
            chain_code: [0; 32],
        };
        let index = HARDENED_OFFSET + 5;

        let err = derive_hardened_child(&parent, index).unwrap_err();
        assert_eq!(err.tag(), "DerivationFailure");
        match err {
            KeygenError::DerivationFailure {
                tier,
                index: failed,
                reason,
            } => {
                assert_eq!(tier, 3);
                assert_eq!(failed, index);
                assert!(reason.contains("corrupted parent key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_zero_parent_key_rejected() {
        let parent = ExtendedKey {
            depth: 0,
            key: [0; 32],
            chain_code: [1; 32],
        };
        assert!(matches!(
            derive_hardened_child(&parent, HARDENED_OFFSET),
            Err(KeygenError::DerivationFailure { tier: 1, .. })
        ));
    }

    #[test]
    fn test_every_tier_is_hardened() {
        let path = DerivationPath::new([0, 1, 2, HARDENED_OFFSET - 1]).unwrap();
        for index in path.hardened_indices() {
            assert!(index >= HARDENED_OFFSET);
        }
        assert_eq!(
            path.hardened_indices(),
            [0x8000_0000, 0x8000_0001, 0x8000_0002, 0xffff_ffff]
        );
    }

    #[test]
    fn test_child_derivation_deterministic() {
        let master = master_key(abandon_seed().as_slice()).unwrap();
        let a = derive_hardened_child(&master, HARDENED_OFFSET + 7).unwrap();
        let b = derive_hardened_child(&master, HARDENED_OFFSET + 7).unwrap();
        let c = derive_hardened_child(&master, HARDENED_OFFSET + 8).unwrap();

        assert_eq!(a.key(), b.key());
        assert_eq!(a.chain_code(), b.chain_code());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_component_overflow_rejected() {
        let err = DerivationPath::new([44, HARDENED_OFFSET, 0, 0]).unwrap_err();
        assert_eq!(err.tag(), "InvalidDerivationPath");
        assert!(err.to_string().contains("tier 2"));
    }

    #[test]
    fn test_from_optional() {
        assert_eq!(
            DerivationPath::from_optional([None; 4]).unwrap(),
            DerivationPath::default()
        );
        assert_eq!(
            DerivationPath::from_optional([Some(0); 4])
                .unwrap()
                .components(),
            [0, 0, 0, 0]
        );
        assert!(DerivationPath::from_optional([Some(44), None, None, None]).is_err());
    }

    #[test]
    fn test_try_from_slice_length() {
        assert!(DerivationPath::try_from(&[44u32, 7337, 0][..]).is_err());
        assert!(DerivationPath::try_from(Vec::<u32>::new()).is_err());
        assert_eq!(
            DerivationPath::try_from(&[44u32, 7337, 0, 0][..]).unwrap(),
            DerivationPath::default()
        );
    }

    #[test]
    fn test_derivation_path_parsing_and_formatting() {
        let path: DerivationPath = "44,7337,0,0".parse().unwrap();
        assert_eq!(path, DerivationPath::default());
        assert_eq!(path.to_string(), "m/44'/7337'/0'/0'");

        let path: DerivationPath = "m/44'/60h/1'/2'".parse().unwrap();
        assert_eq!(path.components(), [44, 60, 1, 2]);

        assert!("m/44'/7337'/0'".parse::<DerivationPath>().is_err());
        assert!("44,abc,0,0".parse::<DerivationPath>().is_err());
    }

    #[test]
    fn test_derivation_path_serialization() {
        let json = serde_json::to_string(&DerivationPath::default()).unwrap();
        assert_eq!(json, "[44,7337,0,0]");

        let parsed: DerivationPath = serde_json::from_str("[1,2,3,4]").unwrap();
        assert_eq!(parsed.components(), [1, 2, 3, 4]);
        assert!(serde_json::from_str::<DerivationPath>("[1,2,3]").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let master = master_key(abandon_seed().as_slice()).unwrap();
        let debug = format!("{:?}", master);
        assert!(debug.contains("redacted"));
        assert!(!debug.contains("1837c1be"));
    }
}
