//! Error types for the MFKDF policy engine.

use thiserror::Error;

/// Result type alias for MFKDF operations.
pub type Result<T> = std::result::Result<T, MfkdfError>;

/// Unified error type for policy validation, quorum evaluation, factor
/// handling, threshold combination, and key derivation.
#[derive(Debug, Error)]
pub enum MfkdfError {
    /// A policy failed structural validation: duplicate id, unknown
    /// factor type, or malformed `params`.
    #[error("policy error: {0}")]
    Policy(String),

    /// Fewer than `threshold` factors were present, either before or
    /// after material acquisition.
    #[error("insufficient factors: need {required}, have {present}")]
    Quorum {
        /// quorum threshold required by the policy
        required: usize,
        /// number of factors actually present/resolved
        present: usize,
    },

    /// An unknown KDF type or unsupported digest was requested.
    #[error("config error: {0}")]
    Config(String),

    /// A factor handler reported a failure: wrong input shape, window
    /// exceeded, bad pad length, etc.
    #[error("factor error: {0}")]
    Factor(String),

    /// k/n inconsistency or share-vector length mismatch in the
    /// threshold engine.
    #[error("threshold error: {0}")]
    Threshold(String),

    /// A pluggable cryptographic primitive failed.
    #[error(transparent)]
    Crypto(#[from] mfkdf_primitives::error::PrimitiveError),
}
