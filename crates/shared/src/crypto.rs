//! Random code generation and HMAC signing.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Error type for signing operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid HMAC key")]
    InvalidKey,
}

/// Number of random bytes behind an invite code (rendered as hex).
pub const INVITE_CODE_BYTES: usize = 4;

/// Generates an invite code: 4 random bytes as 8 lowercase hex characters.
pub fn generate_invite_code() -> String {
    let mut bytes = [0u8; INVITE_CODE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generates a URL-safe random token from `len` random bytes.
pub fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// HMAC-SHA256 of `payload` under `secret`, hex encoded.
pub fn hmac_sha256_hex(secret: &[u8], payload: &str) -> Result<String, CryptoError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| CryptoError::InvalidKey)?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a hex HMAC-SHA256 signature.
pub fn verify_hmac_sha256_hex(secret: &[u8], payload: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload.as_bytes());
    mac.verify_slice(&expected).is_ok()
}
