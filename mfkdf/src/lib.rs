//! # Multi-Factor Key Derivation (MFKDF)
//!
//! Derives a stable cryptographic key from a quorum of heterogeneous
//! authentication factors — passwords, security questions, HMAC-SHA1
//! challenge tokens, HOTP/TOTP codes, pre-sharded persisted secrets, and
//! recursive sub-policies ("stacks") — combined via a (k, n) threshold
//! secret-sharing scheme.
//!
//! ## Quick start
//!
//! ```rust
//! use std::collections::HashMap;
//! use mfkdf::{config, derive, factor::FactorInput, policy::Policy};
//!
//! let password = config::password(32).unwrap();
//! let question = config::question(32).unwrap();
//! let policy = Policy {
//!     threshold: 1,
//!     size: 32,
//!     kdf: config::KdfDefaults::owasp(),
//!     salt: vec![0u8; 16],
//!     factors: vec![password, question],
//! };
//!
//! let mut inputs = HashMap::new();
//! inputs.insert("password".to_string(), FactorInput::Password("correct horse".into()));
//!
//! let bundle = derive::derive(&policy, &inputs).unwrap();
//! assert_eq!(bundle.key.len(), 32);
//! // persist `bundle.policy` for the next derivation; its factor params
//! // have rotated even though the derived key above stayed the same.
//! ```
//!
//! ## Security model
//!
//! A derivation never succeeds with fewer than `policy.threshold` resolvable
//! factors (`QuorumError`), and rotates every present factor's stored
//! parameters on each successful derivation without changing the derived
//! key, so a compromised factor response cannot be replayed. Key, secret,
//! share, and password/answer bytes are held in [`zeroize::Zeroizing`]
//! buffers throughout and wiped on drop.
//!
//! ## Non-goals
//!
//! This crate derives keys from factors; it does not persist policies,
//! transport them between devices, prompt end users for factor input, or
//! provide key escrow. Those concerns belong to the embedding application.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bundle;
pub mod config;
pub mod derive;
pub mod error;
pub mod factor;
pub mod policy;
pub mod share;
pub mod threshold;

pub use bundle::DerivedKeyBundle;
pub use derive::derive;
pub use error::{MfkdfError, Result};
pub use policy::{FactorDescriptor, FactorType, KdfConfig, KdfType, Policy};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bundle::DerivedKeyBundle;
    pub use crate::config;
    pub use crate::derive::derive;
    pub use crate::error::{MfkdfError, Result};
    pub use crate::factor::FactorInput;
    pub use crate::policy::{FactorDescriptor, FactorType, KdfConfig, Policy};
}
