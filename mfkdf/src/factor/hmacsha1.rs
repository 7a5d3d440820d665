//! HMAC-SHA1 challenge/response factor (spec.md §4.4.3).
//!
//! The factor's stored `pad` XORs against the token's 20-byte response to
//! recover a pseudorandom secret. Rotation pre-commits a fresh challenge
//! and a pad that recovers the *same* secret from the token's response to
//! that new challenge, so the next authentication round-trips.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use mfkdf_primitives::hash::{hmac, Digest};
use mfkdf_primitives::rng::random_bytes;

use crate::error::{MfkdfError, Result};
use crate::factor::Material;

/// Persisted params for an HMAC-SHA1 factor slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// hex-encoded 20-byte pad XORed against the token's challenge response
    pub pad: String,
}

/// Derive [`Material`] from a 20-byte HMAC-SHA1 token response.
pub fn derive(params: &Params, response: &[u8]) -> Result<Material> {
    if response.len() != 20 {
        return Err(MfkdfError::Factor(format!(
            "HMAC-SHA1 response must be 20 bytes, got {}",
            response.len()
        )));
    }
    let pad = hex::decode(&params.pad)
        .map_err(|e| MfkdfError::Factor(format!("malformed HMAC-SHA1 pad: {e}")))?;
    if pad.len() != 20 {
        return Err(MfkdfError::Factor("HMAC-SHA1 pad must be 20 bytes".into()));
    }
    let secret: Vec<u8> = response.iter().zip(pad.iter()).map(|(a, b)| a ^ b).collect();

    let challenge = random_bytes(64)?;
    let mac = hmac(Digest::Sha1, &secret, &challenge)?;
    let next_pad: Vec<u8> = mac[..20].iter().zip(secret.iter()).map(|(a, b)| a ^ b).collect();

    Ok(Material {
        data: Zeroizing::new(secret),
        next_params: serde_json::json!({
            "challenge": hex::encode(&challenge),
            "pad": hex::encode(&next_pad),
        }),
        output: serde_json::json!({}),
    })
}
