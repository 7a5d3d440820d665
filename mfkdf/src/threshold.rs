//! The threshold factor-combining engine: `combine(k, n, shares)` and
//! `recover(k, n, shares)` over GF(256), covering 1-of-n, n-of-n, and
//! general k-of-n Shamir sharing with hole-punched share vectors.
//!
//! `recover` is what makes rotation possible: pads for slots the caller
//! did not present still need a canonical share value, reconstructed by
//! evaluating the same degree-(k-1) polynomial at that slot's index.
//!
//! The general `1 < k < n` path round-trips every present share through
//! the [`crate::share`] hex wire encoding (spec.md §4.2) before
//! interpolating: each present slot is encoded with its position and `n`,
//! then immediately decoded back to an `(index, data)` pair, so the index
//! a point is evaluated at is the one recovered from the wire format
//! rather than just the slice position. See `DESIGN.md` for why the
//! interpolation itself stays fixed at GF(256) rather than the variable
//! `GF(2^bits)` the original's `secrets.js`-derived scheme uses.

use std::sync::OnceLock;

use crate::error::{MfkdfError, Result};
use crate::share;

/// A single share slot: present with its raw bytes, or a hole.
pub type ShareSlot = Option<Vec<u8>>;

struct GfTables {
    exp: [u8; 512],
    log: [u8; 256],
}

fn gf_tables() -> &'static GfTables {
    static TABLES: OnceLock<GfTables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut exp = [0u8; 512];
        let mut log = [0u8; 256];
        let mut x: u16 = 1;
        for i in 0..255usize {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= 0x11b;
            }
        }
        for i in 255..512 {
            exp[i] = exp[i - 255];
        }
        GfTables { exp, log }
    })
}

fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = gf_tables();
    let sum = t.log[a as usize] as usize + t.log[b as usize] as usize;
    t.exp[sum]
}

fn gf_div(a: u8, b: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    debug_assert!(b != 0, "division by zero in GF(256)");
    let t = gf_tables();
    let diff = (t.log[a as usize] as i32 - t.log[b as usize] as i32).rem_euclid(255);
    t.exp[diff as usize]
}

fn check_kn_shape(k: usize, n: usize, shares: &[ShareSlot]) -> Result<()> {
    if k == 0 {
        return Err(MfkdfError::Threshold("threshold k must be positive".into()));
    }
    if n == 0 {
        return Err(MfkdfError::Threshold("share count n must be positive".into()));
    }
    if k > n {
        return Err(MfkdfError::Threshold(format!("threshold k={k} exceeds n={n}")));
    }
    if shares.len() != n {
        return Err(MfkdfError::Threshold(format!(
            "share vector length {} does not match n={n}",
            shares.len()
        )));
    }
    Ok(())
}

fn check_kn_full(k: usize, n: usize, shares: &[ShareSlot]) -> Result<()> {
    check_kn_shape(k, n, shares)?;
    let present = shares.iter().filter(|s| s.is_some()).count();
    if present < k {
        return Err(MfkdfError::Threshold(format!(
            "insufficient shares: need {k}, have {present}"
        )));
    }
    Ok(())
}

/// Encode each present slot as a spec.md §4.2 hex share and immediately
/// decode it back, so the `(index, data)` pair each point is interpolated
/// at is the one the wire format carries rather than just the vector
/// position — this is the Shamir-combine-over-the-hex-encoding spec.md
/// §4.3 prescribes, not a parallel direct-byte path.
fn present_points(shares: &[ShareSlot], n: usize) -> Result<Vec<(u8, Vec<u8>)>> {
    let mut points = Vec::new();
    for (i, slot) in shares.iter().enumerate() {
        if let Some(data) = slot {
            let wire = share::encode(i, n, data);
            let (index, decoded) = share::decode(&wire)?;
            points.push(((index + 1) as u8, decoded));
        }
    }
    Ok(points)
}

/// Evaluate the degree-(k-1) polynomial defined by `points` at `x`,
/// byte-by-byte over the shared secret.
fn lagrange_eval(points: &[(u8, Vec<u8>)], x: u8, size: usize) -> Vec<u8> {
    let mut out = vec![0u8; size];
    for byte_idx in 0..size {
        let mut acc = 0u8;
        for (i, (xi, yi)) in points.iter().enumerate() {
            let mut basis = 1u8;
            for (j, (xj, _)) in points.iter().enumerate() {
                if i == j {
                    continue;
                }
                let numerator = x ^ xj;
                let denominator = xi ^ xj;
                basis = gf_mul(basis, gf_div(numerator, denominator));
            }
            acc ^= gf_mul(basis, yi[byte_idx]);
        }
        out[byte_idx] = acc;
    }
    out
}

/// Combine `n` share slots (holes permitted where `k < n`) into the
/// shared secret, per the core spec's three regimes.
pub fn combine(shares: &[ShareSlot], k: usize, n: usize) -> Result<Vec<u8>> {
    check_kn_shape(k, n, shares)?;
    if k == 1 {
        let first = shares
            .iter()
            .find_map(|s| s.as_ref())
            .ok_or_else(|| MfkdfError::Threshold("no present share in 1-of-n scheme".into()))?;
        return Ok(first.clone());
    }
    if k == n {
        let mut iter = shares.iter();
        let mut secret = iter
            .next()
            .and_then(|s| s.clone())
            .ok_or_else(|| MfkdfError::Threshold("holes are not permitted in n-of-n mode".into()))?;
        for slot in iter {
            let share = slot
                .as_ref()
                .ok_or_else(|| MfkdfError::Threshold("holes are not permitted in n-of-n mode".into()))?;
            if share.len() != secret.len() {
                return Err(MfkdfError::Threshold("share length mismatch in n-of-n mode".into()));
            }
            for (a, b) in secret.iter_mut().zip(share.iter()) {
                *a ^= *b;
            }
        }
        return Ok(secret);
    }

    check_kn_full(k, n, shares)?;
    let present = present_points(shares, n)?;
    let points = &present[..k];
    let size = points[0].1.len();
    Ok(lagrange_eval(points, 0, size))
}

/// Reconstruct the full n-length share vector, regenerating absent slots
/// by evaluating the Shamir polynomial at each missing index; present
/// shares are preserved bit-exact.
pub fn recover(shares: &[ShareSlot], k: usize, n: usize) -> Result<Vec<Vec<u8>>> {
    check_kn_shape(k, n, shares)?;
    if k == 1 {
        let first = shares
            .iter()
            .find_map(|s| s.as_ref())
            .ok_or_else(|| MfkdfError::Threshold("no present share in 1-of-n scheme".into()))?;
        return Ok(vec![first.clone(); n]);
    }
    if k == n {
        return shares
            .iter()
            .map(|s| {
                s.clone()
                    .ok_or_else(|| MfkdfError::Threshold("holes are not permitted in n-of-n mode".into()))
            })
            .collect();
    }

    check_kn_full(k, n, shares)?;
    let present = present_points(shares, n)?;
    let points = &present[..k];
    let size = points[0].1.len();

    let mut result = Vec::with_capacity(n);
    for (idx, slot) in shares.iter().enumerate() {
        if let Some(share) = slot {
            result.push(share.clone());
        } else {
            let x = (idx + 1) as u8;
            result.push(lagrange_eval(points, x, size));
        }
    }
    Ok(result)
}
