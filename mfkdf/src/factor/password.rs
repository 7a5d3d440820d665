//! Password factor (spec.md §4.4.1): `data = password.as_bytes()`, no
//! rotation state, `output` carries a lightweight strength estimate.

use zeroize::Zeroizing;

use crate::error::{MfkdfError, Result};
use crate::factor::Material;

/// Derive [`Material`] from a non-empty password string.
pub fn derive(password: &str) -> Result<Material> {
    if password.is_empty() {
        return Err(MfkdfError::Factor("password cannot be empty".into()));
    }
    Ok(Material {
        data: Zeroizing::new(password.as_bytes().to_vec()),
        next_params: serde_json::json!({}),
        output: serde_json::json!({ "strength": strength_report(password) }),
    })
}

/// A coarse, corpus-local entropy-class estimate (character-class
/// diversity plus length). No `zxcvbn`-equivalent crate appears anywhere
/// in the corpus, and this field has no testable property in spec.md §8
/// — it is cosmetic UI feedback, not fed back into derivation — so a
/// heuristic stands in for the original's full dictionary-aware scorer.
fn strength_report(password: &str) -> serde_json::Value {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());
    let classes = [has_lower, has_upper, has_digit, has_symbol]
        .iter()
        .filter(|present| **present)
        .count();
    let bits_per_char = match classes {
        0 | 1 => 4.0,
        2 => 5.0,
        3 => 5.5,
        _ => 6.0,
    };
    let entropy_bits = password.chars().count() as f64 * bits_per_char;
    let score = match entropy_bits {
        b if b < 28.0 => 0,
        b if b < 36.0 => 1,
        b if b < 60.0 => 2,
        b if b < 128.0 => 3,
        _ => 4,
    };
    serde_json::json!({ "score": score, "entropy_bits": entropy_bits.round() as i64 })
}
