//! The derived-key bundle (spec.md §4.7): the immutable `{policy', key,
//! secret, shares, outputs}` record returned by [`crate::derive::derive`].

use std::collections::HashMap;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::policy::Policy;

/// Immutable record produced by a successful derivation.
///
/// `key` is the value consumers use as the derived cryptographic key;
/// `policy` is the rotated on-disk policy to persist for the next
/// derivation; `outputs` is per-factor UI feedback. `secret` and `shares`
/// are exposed for advanced re-sharding flows and are not needed for
/// ordinary authentication.
#[derive(ZeroizeOnDrop)]
pub struct DerivedKeyBundle {
    /// rotated policy; counters, time windows, and pads have advanced
    #[zeroize(skip)]
    pub policy: Policy,
    /// derived key, exactly `policy.size` bytes
    pub key: Zeroizing<Vec<u8>>,
    /// the combined secret fed into the final KDF stage
    pub secret: Zeroizing<Vec<u8>>,
    /// full, hole-free n-length share vector (absent slots reconstructed)
    pub shares: Vec<Zeroizing<Vec<u8>>>,
    /// per-factor-id structured, user-facing reports
    #[zeroize(skip)]
    pub outputs: HashMap<String, serde_json::Value>,
}

impl DerivedKeyBundle {
    pub(crate) fn new(
        policy: Policy,
        key: Vec<u8>,
        secret: Vec<u8>,
        shares: Vec<Vec<u8>>,
        outputs: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            policy,
            key: Zeroizing::new(key),
            secret: Zeroizing::new(secret),
            shares: shares.into_iter().map(Zeroizing::new).collect(),
            outputs,
        }
    }
}

impl std::fmt::Debug for DerivedKeyBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeyBundle")
            .field("policy", &self.policy)
            .field("key", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("shares", &format!("<{} redacted shares>", self.shares.len()))
            .field("outputs", &self.outputs)
            .finish()
    }
}
