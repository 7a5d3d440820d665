//! Hex wire encoding for Shamir shares.
//!
//! `"<bits> <index_hex_padded_to_bits><data_hex>"`, where
//! `bits = max(ceil(log2(n+1)), 3)`. [`crate::threshold`]'s general
//! `1 < k < n` path encodes every present share through this format and
//! decodes it straight back before interpolating, per spec.md §4.3
//! ("invoke Shamir combine with the hex encoding of §4.2"); encoding
//! always produces this exact layout, decoding additionally tolerates an
//! odd number of hex nibbles in the data segment (prepending `"0"`).

use crate::error::{MfkdfError, Result};

/// Bit width used to encode share indices for an `n`-share scheme:
/// `max(ceil(log2(n + 1)), 3)`.
pub fn bits_for(n: usize) -> u32 {
    let m = n as u32 + 1;
    let ceil_log2 = if m <= 1 {
        0
    } else {
        u32::BITS - (m - 1).leading_zeros()
    };
    ceil_log2.max(3)
}

/// Encode a single share: `index` is 0-based, `n` is the total share
/// count, `data` is the raw share bytes.
pub fn encode(index: usize, n: usize, data: &[u8]) -> String {
    let bits = bits_for(n) as usize;
    format!("{bits} {:0width$x}{}", index + 1, hex::encode(data), width = bits)
}

/// Decode a share produced by [`encode`], returning its 0-based index and
/// raw data bytes.
pub fn decode(share: &str) -> Result<(usize, Vec<u8>)> {
    let (bits_str, rest) = share
        .split_once(' ')
        .ok_or_else(|| MfkdfError::Threshold(format!("malformed share: {share}")))?;
    let bits: usize = bits_str
        .parse()
        .map_err(|_| MfkdfError::Threshold(format!("malformed share bit-width: {bits_str}")))?;
    if rest.len() < bits {
        return Err(MfkdfError::Threshold(format!("share too short: {share}")));
    }
    let (id_hex, mut data_hex) = rest.split_at(bits);
    let id = usize::from_str_radix(id_hex, 16)
        .map_err(|_| MfkdfError::Threshold(format!("malformed share index: {id_hex}")))?;

    let padded;
    if data_hex.len() % 2 == 1 {
        padded = format!("0{data_hex}");
        data_hex = &padded;
    }
    let data = hex::decode(data_hex)
        .map_err(|e| MfkdfError::Threshold(format!("malformed share data: {e}")))?;

    if id == 0 {
        return Err(MfkdfError::Threshold("share index must be >= 1".into()));
    }
    Ok((id - 1, data))
}
