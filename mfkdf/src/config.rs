//! Builder-style default constructors for policies, KDF configs, and
//! per-factor descriptors (spec.md §6), mirroring the teacher's
//! `KdfConfig::default()` / `high_security()` / `low_memory()` pattern.
//!
//! These are convenience sugar over [`crate::policy`]'s plain structs —
//! nothing here is required to call [`crate::derive::derive`] directly
//! against a hand-built [`Policy`].

use mfkdf_primitives::rng::random_bytes;

use crate::error::Result;
use crate::policy::{FactorDescriptor, FactorType, KdfConfig, KdfParams, KdfType};

/// Default final-KDF configurations (spec.md §6's enumerated defaults).
pub struct KdfDefaults;

impl KdfDefaults {
    /// argon2id, 2 iterations, 24576 KiB, parallelism 1 — the OWASP
    /// password-hashing baseline and this crate's overall default.
    pub fn owasp() -> KdfConfig {
        KdfConfig {
            kdf_type: KdfType::Argon2id,
            params: KdfParams {
                rounds: Some(2),
                memory: Some(24576),
                parallelism: Some(1),
                ..Default::default()
            },
        }
    }

    /// argon2id tuned for higher compute/memory cost than [`Self::owasp`].
    pub fn high_security() -> KdfConfig {
        KdfConfig {
            kdf_type: KdfType::Argon2id,
            params: KdfParams {
                rounds: Some(4),
                memory: Some(262_144),
                parallelism: Some(4),
                ..Default::default()
            },
        }
    }

    /// argon2id tuned for constrained environments.
    pub fn low_memory() -> KdfConfig {
        KdfConfig {
            kdf_type: KdfType::Argon2id,
            params: KdfParams {
                rounds: Some(4),
                memory: Some(16384),
                parallelism: Some(2),
                ..Default::default()
            },
        }
    }

    /// plain PBKDF2-HMAC-SHA256 at the spec default round count, for
    /// interop with the original reference's default policy KDF.
    pub fn pbkdf2() -> KdfConfig {
        KdfConfig {
            kdf_type: KdfType::Pbkdf2,
            params: KdfParams {
                rounds: Some(310_000),
                digest: Some("sha256".into()),
                ..Default::default()
            },
        }
    }

    /// single-round PBKDF2, used as the default KDF for `stack` sub-policies
    /// (the sub-policy's own factors already carry the real work factor).
    pub fn stack_default() -> KdfConfig {
        KdfConfig {
            kdf_type: KdfType::Pbkdf2,
            params: KdfParams {
                rounds: Some(1),
                digest: Some("sha256".into()),
                ..Default::default()
            },
        }
    }
}

fn fresh_pad(size: usize) -> Result<Vec<u8>> {
    Ok(random_bytes(size)?)
}

fn fresh_salt() -> Result<Vec<u8>> {
    Ok(random_bytes(16)?)
}

/// Default-id (`"password"`) descriptor for a password factor.
pub fn password(size: usize) -> Result<FactorDescriptor> {
    password_with_id("password", size)
}

/// Password factor descriptor with an explicit id.
pub fn password_with_id(id: &str, size: usize) -> Result<FactorDescriptor> {
    Ok(FactorDescriptor {
        id: id.to_string(),
        factor_type: FactorType::Password,
        pad: fresh_pad(size)?,
        salt: fresh_salt()?,
        params: serde_json::json!({}),
    })
}

/// Default-id (`"question"`) descriptor for a security-question factor.
pub fn question(size: usize) -> Result<FactorDescriptor> {
    question_with_id("question", size)
}

/// Security-question factor descriptor with an explicit id.
pub fn question_with_id(id: &str, size: usize) -> Result<FactorDescriptor> {
    Ok(FactorDescriptor {
        id: id.to_string(),
        factor_type: FactorType::Question,
        pad: fresh_pad(size)?,
        salt: fresh_salt()?,
        params: serde_json::json!({}),
    })
}

/// HMAC-SHA1 challenge/response factor descriptor.
///
/// `secret` is the 20-byte pseudorandom value shared with the external
/// token; the stored `pad` XORs the token's response to the initial
/// `challenge` back to `secret`, matching [`crate::factor::hmacsha1`]'s
/// recovery law.
pub fn hmacsha1(size: usize, secret: &[u8; 20]) -> Result<FactorDescriptor> {
    hmacsha1_with_id("hmacsha1", size, secret)
}

/// HMAC-SHA1 factor descriptor with an explicit id.
pub fn hmacsha1_with_id(id: &str, size: usize, secret: &[u8; 20]) -> Result<FactorDescriptor> {
    let challenge = random_bytes(64)?;
    let mac = mfkdf_primitives::hash::hmac(mfkdf_primitives::hash::Digest::Sha1, secret, &challenge)?;
    let pad: Vec<u8> = mac[..20].iter().zip(secret.iter()).map(|(a, b)| a ^ b).collect();
    Ok(FactorDescriptor {
        id: id.to_string(),
        factor_type: FactorType::Hmacsha1,
        pad: fresh_pad(size)?,
        salt: fresh_salt()?,
        params: serde_json::json!({ "challenge": hex::encode(challenge), "pad": hex::encode(pad) }),
    })
}

/// HOTP factor descriptor (`hash: sha1, digits: 6`, spec.md §6 default)
/// seeded with a fresh random secret and a zero initial offset.
pub fn hotp(size: usize) -> Result<FactorDescriptor> {
    hotp_with_id("hotp", size)
}

/// HOTP factor descriptor with an explicit id.
pub fn hotp_with_id(id: &str, size: usize) -> Result<FactorDescriptor> {
    let secret = random_bytes(20)?;
    Ok(FactorDescriptor {
        id: id.to_string(),
        factor_type: FactorType::Hotp,
        pad: fresh_pad(size)?,
        salt: fresh_salt()?,
        params: serde_json::json!({
            "hash": "sha1",
            "digits": 6,
            "pad": base64::engine::Engine::encode(&base64::engine::general_purpose::STANDARD, &secret),
            "counter": 0,
            "offset": 0,
        }),
    })
}

/// TOTP factor descriptor (`hash: sha1, digits: 6, step: 30, window: 87600`,
/// spec.md §6 default — an 87600-step window at a 30s step covers roughly a
/// month either side of `start`), seeded with a fresh random secret and an
/// all-zero offsets buffer anchored at `start_ms`.
pub fn totp(size: usize, start_ms: i64) -> Result<FactorDescriptor> {
    totp_with_id("totp", size, start_ms)
}

/// TOTP factor descriptor with an explicit id.
pub fn totp_with_id(id: &str, size: usize, start_ms: i64) -> Result<FactorDescriptor> {
    const WINDOW: usize = 87600;
    let secret = random_bytes(20)?;
    let offsets = vec![0u8; WINDOW * 4];
    Ok(FactorDescriptor {
        id: id.to_string(),
        factor_type: FactorType::Totp,
        pad: fresh_pad(size)?,
        salt: fresh_salt()?,
        params: serde_json::json!({
            "start": start_ms,
            "hash": "sha1",
            "digits": 6,
            "step": 30,
            "window": WINDOW,
            "pad": base64::engine::Engine::encode(&base64::engine::general_purpose::STANDARD, &secret),
            "offsets": base64::engine::Engine::encode(&base64::engine::general_purpose::STANDARD, &offsets),
        }),
    })
}

/// Pre-sharded `persisted` factor descriptor. The share data itself is
/// supplied at derivation time via `FactorInput::Persisted`, never stored
/// in the policy document, so `params` stays empty.
pub fn persisted(id: &str, size: usize) -> Result<FactorDescriptor> {
    Ok(FactorDescriptor {
        id: id.to_string(),
        factor_type: FactorType::Persisted,
        pad: fresh_pad(size)?,
        salt: fresh_salt()?,
        params: serde_json::json!({}),
    })
}

/// Wrap `sub_policy` as a `stack` factor descriptor, counting as one slot
/// toward the outer quorum.
pub fn stack(id: &str, size: usize, sub_policy: &crate::policy::Policy) -> Result<FactorDescriptor> {
    Ok(FactorDescriptor {
        id: id.to_string(),
        factor_type: FactorType::Stack,
        pad: fresh_pad(size)?,
        salt: fresh_salt()?,
        params: serde_json::to_value(sub_policy)
            .map_err(|e| crate::error::MfkdfError::Policy(e.to_string()))?,
    })
}

/// Default policy key size in bytes (spec.md §6: `key { size: 32 }`).
pub const DEFAULT_KEY_SIZE: usize = 32;
