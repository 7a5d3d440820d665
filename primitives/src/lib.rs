//! # mfkdf-primitives
//!
//! Pluggable cryptographic primitive adapters consumed by the `mfkdf`
//! policy engine: KDF dispatch (PBKDF2, bcrypt, scrypt, Argon2i/d/id,
//! HKDF), HMAC/HKDF, HOTP code generation, and OS randomness.
//!
//! This crate has no notion of policies, factors, or shares — it exposes
//! uniform, stateless functions with fixed signatures, exactly the "pluggable
//! cryptographic services" boundary the MFKDF core specification draws
//! around these primitives.
//!
//! ## Example
//!
//! ```
//! use mfkdf_primitives::kdf::{kdf, KdfAlgorithm};
//! use mfkdf_primitives::hash::Digest;
//!
//! let alg = KdfAlgorithm::Pbkdf2 { rounds: 1000, digest: Digest::Sha256 };
//! let key = kdf(&alg, b"hunter2", &[0u8; 16], 32).unwrap();
//! assert_eq!(key.len(), 32);
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod error;
pub mod hash;
pub mod kdf;
pub mod otp;
pub mod rng;

pub use error::{PrimitiveError, Result};
pub use hash::Digest;
pub use kdf::{kdf as derive_kdf, KdfAlgorithm};
pub use otp::hotp_code;

/// Library version, as reported by Cargo.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenience re-exports for `use mfkdf_primitives::prelude::*;`.
pub mod prelude {
    pub use crate::error::{PrimitiveError, Result};
    pub use crate::hash::{hkdf, hmac, Digest};
    pub use crate::kdf::{kdf, KdfAlgorithm};
    pub use crate::otp::hotp_code;
    pub use crate::rng::random_bytes;
}
