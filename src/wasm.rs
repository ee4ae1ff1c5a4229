use crate::crypto::hd::DerivationPath;
use crate::error::KeygenError;
use crate::keypair::generate_keypair_json;
use crate::signing::{sign_message, verify_message};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

// Host-side adapters. They return the tagged error JSON as `Err(String)` so
// they can be exercised off-wasm; the exported wrappers only convert types.

/// Keypair call with the six positional host arguments
///
/// Path components arrive as `undefined` when the caller omits them: all four
/// absent selects the default path, all four present is used verbatim.
pub fn generate_keypair_for_host(
    mnemonic: &str,
    passphrase: &str,
    path: [Option<u32>; 4],
) -> Result<String, String> {
    DerivationPath::from_optional(path)
        .and_then(|path| generate_keypair_json(mnemonic, passphrase, Some(path)))
        .map_err(|e| host_error(&e))
}

pub fn sign_for_host(data: &str, private_key: &str) -> Result<String, String> {
    sign_message(data.as_bytes(), private_key).map_err(|e| host_error(&e))
}

/// Verify call for the host
///
/// A key or signature that cannot be decoded is reported as `false`, like a
/// mismatch; [`verify_message`] keeps the detailed error for Rust callers.
pub fn verify_for_host(data: &str, signature: &str, public_key: &str) -> bool {
    match verify_message(data.as_bytes(), signature, public_key) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::debug!(error = e.tag(), "Rejecting malformed verify input: {}", e);
            false
        }
    }
}

fn host_error(err: &KeygenError) -> String {
    tracing::warn!(error = err.tag(), "Host call failed: {}", err);
    err.to_json()
}

// WASM-exposed functions

#[wasm_bindgen(js_name = generateEd25519Keypair)]
pub fn wasm_generate_ed25519_keypair(
    mnemonic: String,
    passphrase: String,
    purpose: Option<u32>,
    coin_type: Option<u32>,
    account: Option<u32>,
    chain: Option<u32>,
) -> Result<String, JsValue> {
    generate_keypair_for_host(
        &mnemonic,
        &passphrase,
        [purpose, coin_type, account, chain],
    )
    .map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen(js_name = signEd25519)]
pub fn wasm_sign_ed25519(data: String, private_key: String) -> Result<String, JsValue> {
    sign_for_host(&data, &private_key).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen(js_name = verifyEd25519)]
pub fn wasm_verify_ed25519(
    data: String,
    signature: String,
    public_key: String,
) -> bool {
    verify_for_host(&data, &signature, &public_key)
}
