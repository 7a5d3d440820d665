//! HOTP code generation (RFC 4226).
//!
//! TOTP's time-bucketing, window management, and rotation bookkeeping are
//! policy-level concerns (see `mfkdf::factor::totp`); this module only
//! supplies the single-counter primitive both HOTP and TOTP are built on.

use crate::hash::{hmac, Digest};
use crate::error::Result;

/// `HOTP(secret, counter, digest, digits) -> code in [0, 10^digits)`.
pub fn hotp_code(secret: &[u8], counter: u64, digest: Digest, digits: u32) -> Result<u32> {
    let mac = hmac(digest, secret, &counter.to_be_bytes())?;
    let offset = (mac[mac.len() - 1] & 0x0f) as usize;
    let truncated = ((mac[offset] as u32 & 0x7f) << 24)
        | ((mac[offset + 1] as u32) << 16)
        | ((mac[offset + 2] as u32) << 8)
        | (mac[offset + 3] as u32);
    Ok(truncated % 10u32.pow(digits))
}
