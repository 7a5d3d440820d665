//! Policy document: the declarative, persisted tree describing factor ids,
//! types, pads, salts, quorum thresholds, and KDF parameters.
//!
//! `validate` and `evaluate` are pure, total, and structurally recursive on
//! the policy tree, descending into `FactorType::Stack`'s embedded
//! sub-policy the same way a rule engine resolves nested conditions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{MfkdfError, Result};

/// A k-of-n policy over an ordered sequence of factor descriptors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// quorum threshold k
    pub threshold: usize,
    /// bytes of derived key/secret/share output
    pub size: usize,
    /// KDF configuration applied to the combined secret
    pub kdf: KdfConfig,
    /// KDF salt
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
    /// ordered factor descriptors; share slot index == position in this vector
    pub factors: Vec<FactorDescriptor>,
}

/// One factor slot in a policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorDescriptor {
    /// unique id, across the entire recursive policy tree
    pub id: String,
    /// factor kind
    #[serde(rename = "type")]
    pub factor_type: FactorType,
    /// XOR mask binding this slot's HKDF output to the slot, length `policy.size`
    #[serde(with = "base64_bytes")]
    pub pad: Vec<u8>,
    /// per-factor salt, distinct from the policy salt
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
    /// type-specific parameter record
    pub params: serde_json::Value,
}

/// Tagged factor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorType {
    /// pre-sharded slot; `share = data` verbatim
    Persisted,
    /// UTF-8 password
    Password,
    /// UTF-8 security question answer
    Question,
    /// HMAC-SHA1 challenge/response token
    Hmacsha1,
    /// RFC 4226 HOTP code
    Hotp,
    /// RFC 6238 TOTP code
    Totp,
    /// recursive sub-policy presented as one factor
    Stack,
}

/// Tagged KDF configuration applied to the combined secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfConfig {
    /// KDF family
    #[serde(rename = "type")]
    pub kdf_type: KdfType,
    /// family-specific parameters
    pub params: KdfParams,
}

/// KDF family selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfType {
    /// PBKDF2-HMAC
    Pbkdf2,
    /// bcrypt, stretched with PBKDF2
    Bcrypt,
    /// scrypt
    Scrypt,
    /// Argon2i
    Argon2i,
    /// Argon2d
    Argon2d,
    /// Argon2id
    Argon2id,
    /// HKDF
    Hkdf,
}

/// Union of every KDF family's parameters; unused fields are `None` for a
/// given `KdfType`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KdfParams {
    /// iteration count (pbkdf2); CPU/memory cost N (scrypt); time cost t (argon2*)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounds: Option<u32>,
    /// HMAC digest name (pbkdf2, hkdf): "sha1" | "sha256" | "sha384" | "sha512"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// block size r (scrypt)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocksize: Option<u32>,
    /// parallelization parameter p (scrypt, argon2*)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<u32>,
    /// memory cost in KiB (argon2*)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
}

impl KdfConfig {
    /// Resolve this policy-document configuration into a primitive-crate
    /// [`mfkdf_primitives::kdf::KdfAlgorithm`], applying spec defaults for
    /// any field the document omitted.
    pub fn to_algorithm(&self) -> Result<mfkdf_primitives::kdf::KdfAlgorithm> {
        use mfkdf_primitives::hash::Digest;
        use mfkdf_primitives::kdf::KdfAlgorithm;

        let digest_of = |name: &Option<String>, default: &str| -> Result<Digest> {
            Digest::from_name(name.as_deref().unwrap_or(default))
                .map_err(|e| MfkdfError::Config(e.to_string()))
        };

        Ok(match self.kdf_type {
            KdfType::Pbkdf2 => KdfAlgorithm::Pbkdf2 {
                rounds: self.params.rounds.unwrap_or(310_000),
                digest: digest_of(&self.params.digest, "sha256")?,
            },
            KdfType::Bcrypt => KdfAlgorithm::Bcrypt {
                rounds: self.params.rounds.unwrap_or(10),
            },
            KdfType::Scrypt => KdfAlgorithm::Scrypt {
                rounds: self.params.rounds.unwrap_or(16384),
                blocksize: self.params.blocksize.unwrap_or(8),
                parallelism: self.params.parallelism.unwrap_or(1),
            },
            KdfType::Argon2i => KdfAlgorithm::Argon2i {
                rounds: self.params.rounds.unwrap_or(2),
                memory: self.params.memory.unwrap_or(24576),
                parallelism: self.params.parallelism.unwrap_or(1),
            },
            KdfType::Argon2d => KdfAlgorithm::Argon2d {
                rounds: self.params.rounds.unwrap_or(2),
                memory: self.params.memory.unwrap_or(24576),
                parallelism: self.params.parallelism.unwrap_or(1),
            },
            KdfType::Argon2id => KdfAlgorithm::Argon2id {
                rounds: self.params.rounds.unwrap_or(2),
                memory: self.params.memory.unwrap_or(24576),
                parallelism: self.params.parallelism.unwrap_or(1),
            },
            KdfType::Hkdf => KdfAlgorithm::Hkdf {
                digest: digest_of(&self.params.digest, "sha512")?,
            },
        })
    }
}

/// Collect every id in the recursive policy tree and reject duplicates
/// (I1/I5/P5).
pub fn validate(policy: &Policy) -> bool {
    let mut seen = HashSet::new();
    collect_ids(policy, &mut seen)
}

fn collect_ids(policy: &Policy, seen: &mut HashSet<String>) -> bool {
    for factor in &policy.factors {
        if !seen.insert(factor.id.clone()) {
            return false;
        }
        if factor.factor_type == FactorType::Stack {
            match serde_json::from_value::<Policy>(factor.params.clone()) {
                Ok(sub) => {
                    if !collect_ids(&sub, seen) {
                        return false;
                    }
                }
                Err(_) => return false,
            }
        }
    }
    true
}

/// Count how many of `policy.factors` are satisfied by `present`
/// (recursing into stacks), and compare against `policy.threshold`.
pub fn evaluate(policy: &Policy, present: &HashSet<String>) -> bool {
    let mut count = 0usize;
    for factor in &policy.factors {
        let satisfied = if factor.factor_type == FactorType::Stack {
            serde_json::from_value::<Policy>(factor.params.clone())
                .map(|sub| evaluate(&sub, present))
                .unwrap_or(false)
        } else {
            present.contains(&factor.id)
        };
        if satisfied {
            count += 1;
        }
    }
    count >= policy.threshold
}

/// Structural validation beyond id-uniqueness: threshold bounds and
/// per-slot pad/salt length against `policy.size`.
pub fn validate_shape(policy: &Policy) -> Result<()> {
    if policy.threshold == 0 {
        return Err(MfkdfError::Policy("threshold must be positive".into()));
    }
    if policy.threshold > policy.factors.len() {
        return Err(MfkdfError::Policy(format!(
            "threshold {} exceeds factor count {}",
            policy.threshold,
            policy.factors.len()
        )));
    }
    for factor in &policy.factors {
        if factor.factor_type != FactorType::Persisted && factor.pad.len() != policy.size {
            return Err(MfkdfError::Policy(format!(
                "factor {} has pad length {} but policy.size is {}",
                factor.id,
                factor.pad.len(),
                policy.size
            )));
        }
        if factor.factor_type == FactorType::Stack {
            let sub: Policy = serde_json::from_value(factor.params.clone()).map_err(|e| {
                MfkdfError::Policy(format!("factor {}: malformed stack params: {e}", factor.id))
            })?;
            validate_shape(&sub)?;
        }
    }
    if !validate(policy) {
        return Err(MfkdfError::Policy("duplicate factor id".into()));
    }
    Ok(())
}

/// Base64-encode/decode `Vec<u8>` fields via serde's `with` attribute.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        BASE64.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}
