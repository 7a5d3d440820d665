//! HOTP factor (spec.md §4.4.4): the submitted code is offset-shifted into
//! a positive-modulus `target`, which becomes the factor's witness bytes.
//! Rotation advances the counter and precomputes the *next* code's offset
//! so that it maps back to the same target.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use mfkdf_primitives::hash::Digest;
use mfkdf_primitives::otp::hotp_code;

use crate::error::{MfkdfError, Result};
use crate::factor::Material;

/// Persisted params for a HOTP factor slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// HMAC digest backing the HOTP code ("sha1" | "sha256" | "sha384" | "sha512")
    pub hash: String,
    /// number of decimal digits in the code
    pub digits: u32,
    /// base64-encoded HOTP secret
    pub pad: String,
    /// monotonic counter, advanced by one on every derivation
    pub counter: u64,
    /// precomputed offset applied to the submitted code to recover `target`
    pub offset: i64,
}

fn positive_mod(n: i64, m: i64) -> i64 {
    ((n % m) + m) % m
}

/// Derive [`Material`] from a submitted HOTP code (P6: `target` is always
/// in `[0, 10^digits)` even though the intermediate arithmetic can go
/// negative).
pub fn derive(params: &Params, code: u32) -> Result<Material> {
    let modulus = 10i64.pow(params.digits);
    let target = positive_mod(params.offset + code as i64, modulus);
    let data = (target as u32).to_be_bytes().to_vec();

    let digest = Digest::from_name(&params.hash).map_err(|e| MfkdfError::Config(e.to_string()))?;
    let secret = BASE64
        .decode(&params.pad)
        .map_err(|e| MfkdfError::Factor(format!("malformed base64 pad: {e}")))?;

    let next_counter = params.counter + 1;
    let next_code = hotp_code(&secret, next_counter, digest, params.digits)?;
    let next_offset = positive_mod(target - next_code as i64, modulus);

    Ok(Material {
        data: Zeroizing::new(data),
        next_params: serde_json::json!({
            "hash": params.hash,
            "digits": params.digits,
            "pad": params.pad,
            "counter": next_counter,
            "offset": next_offset,
        }),
        output: serde_json::json!({}),
    })
}
