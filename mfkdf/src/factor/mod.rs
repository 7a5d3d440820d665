//! Factor modules: password, question, hmacsha1, hotp, totp.
//!
//! Each factor kind transforms its [`crate::policy::FactorDescriptor`]'s
//! `params` plus a caller-supplied [`FactorInput`] into [`Material`]: the
//! raw witness bytes fed into share derivation, the rotated `params` to
//! persist, and a user-facing `output` report.
//!
//! Rotation is computed eagerly here rather than deferred as a stored
//! closure (spec's "no callable-valued fields" redesign, §9): none of the
//! concrete factor kinds below need the newly derived key to compute
//! their next params, so `next_params` is just another field on
//! `Material`, populated synchronously. Persisted and stack slots are
//! handled directly by the orchestrator (`crate::derive`): persisted
//! because it skips the HKDF/XOR share step entirely, stack because it
//! needs the orchestrator's own recursive `derive` entry point.

pub mod hmacsha1;
pub mod hotp;
pub mod password;
pub mod question;
pub mod totp;

use zeroize::Zeroizing;

/// A factor handler's derivation-time output.
#[derive(Debug, Clone)]
pub struct Material {
    /// Raw factor witness bytes (password bytes, 4-byte HOTP/TOTP target,
    /// HMAC-SHA1-XOR secret).
    pub data: Zeroizing<Vec<u8>>,
    /// Rotated `params` to persist for the next derivation.
    pub next_params: serde_json::Value,
    /// User-visible structured report, not fed back into derivation.
    pub output: serde_json::Value,
}

/// Caller-supplied input for one non-stack, non-persisted factor slot.
///
/// Stack slots are resolved by the orchestrator recursing into the
/// sub-policy with the same flat factor map; persisted slots carry their
/// share verbatim and never invoke a handler at all.
#[derive(Debug, Clone)]
pub enum FactorInput {
    /// UTF-8 password
    Password(String),
    /// UTF-8 security-question answer, canonicalized on derive
    Question(String),
    /// 20-byte HMAC-SHA1 token response
    HmacSha1(Vec<u8>),
    /// HOTP code
    Hotp(u32),
    /// TOTP code, with an optional override of "now" (ms since epoch),
    /// used by tests to exercise specific points in the sliding window
    Totp {
        /// the submitted TOTP code
        code: u32,
        /// ms-since-epoch override; `None` uses the current system time
        time: Option<i64>,
    },
    /// pre-sharded data, used verbatim as the share (spec.md §4.4.6)
    Persisted(Vec<u8>),
}
