//! Error types for the primitive adapter layer.
//!
//! Every failure here is a misconfiguration or an adapter's own
//! operation failing, never a policy- or factor-level concern — those
//! live in the `mfkdf` crate's `MfkdfError`.

use thiserror::Error;

/// Result type alias for primitive-adapter operations.
pub type Result<T> = std::result::Result<T, PrimitiveError>;

/// Errors raised by KDF/HMAC/HKDF/OTP adapters.
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// `kdf.type` did not match any supported algorithm.
    #[error("unknown KDF type: {0}")]
    UnknownKdfType(String),

    /// A digest name did not match any supported hash function.
    #[error("unsupported digest: {0}")]
    UnsupportedDigest(String),

    /// Scrypt cost parameters rejected by the underlying implementation.
    #[error("invalid scrypt parameters: {0}")]
    ScryptParams(String),

    /// Argon2 parameters rejected by the underlying implementation.
    #[error("invalid argon2 parameters: {0}")]
    Argon2Params(String),

    /// HKDF expand failed (requested length exceeds `255 * hash_len`).
    #[error("HKDF expansion failed")]
    HkdfExpand,

    /// OS RNG failed to produce randomness.
    #[error("random number generation failed")]
    RngFailed,
}
