//! TOTP factor (spec.md §4.4.5): a sliding window of `window` precomputed
//! offsets, one per time-step counter starting at `start`. Rotation
//! recomputes the *entire* offsets buffer for the next `window` counters
//! starting at "now", so the window keeps sliding forward every
//! derivation instead of only ever covering the original start time.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use mfkdf_primitives::hash::Digest;
use mfkdf_primitives::otp::hotp_code;

use crate::error::{MfkdfError, Result};
use crate::factor::Material;

/// Persisted params for a TOTP factor slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// ms-since-epoch the `offsets` window was last anchored to
    pub start: i64,
    /// HMAC digest backing the TOTP code
    pub hash: String,
    /// number of decimal digits in the code
    pub digits: u32,
    /// seconds per time step
    pub step: u64,
    /// number of precomputed offsets in the sliding window
    pub window: usize,
    /// base64-encoded TOTP secret
    pub pad: String,
    /// base64-encoded concatenation of `window` 4-byte big-endian offsets
    pub offsets: String,
}

fn positive_mod(n: i64, m: i64) -> i64 {
    ((n % m) + m) % m
}

/// Derive [`Material`] from a submitted TOTP code and the current time
/// (ms since epoch). Fails with `FactorError` if `time` falls outside the
/// window anchored at `start`.
pub fn derive(params: &Params, code: u32, time: i64) -> Result<Material> {
    if time <= 0 {
        return Err(MfkdfError::Factor("time must be positive".into()));
    }
    let offsets = BASE64
        .decode(&params.offsets)
        .map_err(|e| MfkdfError::Factor(format!("malformed base64 offsets: {e}")))?;
    if offsets.len() != params.window * 4 {
        return Err(MfkdfError::Factor("offsets buffer length does not match window".into()));
    }

    let step_ms = params.step as i64 * 1000;
    let start_counter = params.start / step_ms;
    let now_counter = time / step_ms;
    let index = now_counter - start_counter;
    if index < 0 || index as usize >= params.window {
        return Err(MfkdfError::Factor("TOTP window exceeded".into()));
    }
    let idx = index as usize;
    let offset_bytes: [u8; 4] = offsets[4 * idx..4 * idx + 4].try_into().expect("sliced to 4 bytes");
    let offset = u32::from_be_bytes(offset_bytes) as i64;

    let modulus = 10i64.pow(params.digits);
    let target = positive_mod(offset + code as i64, modulus);
    let data = (target as u32).to_be_bytes().to_vec();

    let digest = Digest::from_name(&params.hash).map_err(|e| MfkdfError::Config(e.to_string()))?;
    let secret = BASE64
        .decode(&params.pad)
        .map_err(|e| MfkdfError::Factor(format!("malformed base64 pad: {e}")))?;

    let mut next_offsets = Vec::with_capacity(params.window * 4);
    for i in 0..params.window {
        let counter = (now_counter + i as i64) as u64;
        let code_at = hotp_code(&secret, counter, digest, params.digits)?;
        let next_offset = positive_mod(target - code_at as i64, modulus) as u32;
        next_offsets.extend_from_slice(&next_offset.to_be_bytes());
    }

    Ok(Material {
        data: Zeroizing::new(data),
        next_params: serde_json::json!({
            "start": time,
            "hash": params.hash,
            "digits": params.digits,
            "step": params.step,
            "window": params.window,
            "pad": params.pad,
            "offsets": BASE64.encode(&next_offsets),
        }),
        output: serde_json::json!({}),
    })
}
