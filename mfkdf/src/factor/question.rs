//! Security-question factor (spec.md §4.4.2): canonicalize, then treat the
//! canonical answer like a password.
//!
//! Canonicalization lowercases, strips everything outside `[0-9a-z ]`,
//! then trims leading/trailing spaces. The original implementation
//! applies a *literal* string replace of the regex text rather than
//! matching it (`answer.replace(r'[^0-9a-z ]', '')` never actually
//! strips anything in Python); spec.md §9 adopts the evidently-intended
//! regex-match semantics, which is what this module implements.

use std::sync::OnceLock;

use regex::Regex;
use zeroize::Zeroizing;

use crate::error::{MfkdfError, Result};
use crate::factor::Material;

fn non_canonical_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("[^0-9a-z ]").expect("static pattern is valid"))
}

/// Lowercase, strip to `[0-9a-z ]`, then trim.
pub fn canonicalize(answer: &str) -> String {
    let lowered = answer.to_lowercase();
    let stripped = non_canonical_chars().replace_all(&lowered, "");
    stripped.trim().to_string()
}

/// Derive [`Material`] from a non-empty security-question answer.
/// `current_params` is carried forward unchanged (spec.md's "identity"
/// rotation for this factor kind).
pub fn derive(answer: &str, current_params: &serde_json::Value) -> Result<Material> {
    if answer.is_empty() {
        return Err(MfkdfError::Factor("answer cannot be empty".into()));
    }
    let canonical = canonicalize(answer);
    Ok(Material {
        data: Zeroizing::new(canonical.clone().into_bytes()),
        next_params: current_params.clone(),
        output: serde_json::json!({ "strength": super::password::derive(&canonical).ok().map(|m| m.output["strength"].clone()) }),
    })
}
