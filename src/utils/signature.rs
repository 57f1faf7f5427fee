use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::error::{ApiError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `body` keyed with `secret`.
///
/// This is the value a sender puts in the signature header.
pub fn compute_signature(secret: &str, body: &[u8]) -> Result<String> {
    let mut mac = new_mac(secret)?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a hex HMAC-SHA256 signature over the raw request body.
///
/// `body` must be the bytes exactly as received. The comparison is done in
/// constant time; a header that is not valid hex never matches.
pub fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> Result<bool> {
    let provided = match hex::decode(signature_hex.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Signature header is not valid hex: {}", e);
            return Ok(false);
        }
    };

    let mut mac = new_mac(secret)?;
    mac.update(body);
    Ok(mac.verify_slice(&provided).is_ok())
}

fn new_mac(secret: &str) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ApiError::Internal(format!("Invalid HMAC secret: {}", e)))
}
