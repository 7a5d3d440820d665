//! The key derivation orchestrator (spec.md §4.6): validate, evaluate
//! quorum, expand stacks, derive per-factor material, share, combine,
//! run the final KDF, then rotate the policy.
//!
//! Per-factor derivation (this module's `derive_slot`) and the rotation it
//! produces are independent, CPU-bound units with no shared mutable
//! state, so they run on `rayon`'s work-stealing pool (spec.md §5)
//! instead of sequentially.

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use rayon::prelude::*;
use tracing::{debug, instrument};
use zeroize::Zeroizing;

use mfkdf_primitives::hash::{hkdf, Digest};

use crate::bundle::DerivedKeyBundle;
use crate::error::{MfkdfError, Result};
use crate::factor::{self, FactorInput, Material};
use crate::policy::{self, FactorDescriptor, FactorType, Policy};
use crate::threshold;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the epoch")
        .as_millis() as i64
}

/// Derive a key from `policy` given a (possibly partial) map of factor
/// inputs, keyed by factor id across the *entire* recursive policy tree.
///
/// Fails with `PolicyError` if any id repeats anywhere in the tree, or
/// `QuorumError` if fewer than `policy.threshold` factors can be
/// resolved, either from `factors` directly missing ids or from
/// individual factor handlers rejecting their input.
#[instrument(skip(policy, factors), fields(threshold = policy.threshold, n = policy.factors.len()))]
pub fn derive(policy: &Policy, factors: &HashMap<String, FactorInput>) -> Result<DerivedKeyBundle> {
    if !policy::validate(policy) {
        return Err(MfkdfError::Policy("duplicate factor id in policy tree".into()));
    }
    let present: HashSet<String> = factors.keys().cloned().collect();
    if !policy::evaluate(policy, &present) {
        return Err(MfkdfError::Quorum {
            required: policy.threshold,
            present: present.len(),
        });
    }
    derive_inner(policy, factors)
}

/// The recursive derivation core, shared between the top-level entry
/// point and stack-factor expansion. Does not re-validate id uniqueness
/// (the top-level caller already checked the whole tree); each stack
/// slot individually re-checks its own sub-policy's quorum before
/// attempting to derive it, so an under-quorum stack degrades to a hole
/// rather than failing the whole derivation.
fn derive_inner(policy: &Policy, factors: &HashMap<String, FactorInput>) -> Result<DerivedKeyBundle> {
    let n = policy.factors.len();
    let present: HashSet<String> = factors.keys().cloned().collect();

    let materials: Vec<Option<Material>> = policy
        .factors
        .par_iter()
        .map(|descriptor| derive_slot(descriptor, factors, &present))
        .collect::<Result<Vec<_>>>()?;

    let mut shares: Vec<Option<Vec<u8>>> = Vec::with_capacity(n);
    let mut outputs = HashMap::new();
    for (descriptor, material) in policy.factors.iter().zip(materials.iter()) {
        match material {
            None => shares.push(None),
            Some(material) => {
                let share = if descriptor.factor_type == FactorType::Persisted {
                    material.data.to_vec()
                } else {
                    let hkdf_output = hkdf(Digest::Sha512, &material.data, b"", b"", policy.size)?;
                    xor(&descriptor.pad, &hkdf_output)?
                };
                outputs.insert(descriptor.id.clone(), material.output.clone());
                shares.push(Some(share));
            }
        }
    }

    let present_count = shares.iter().filter(|s| s.is_some()).count();
    if present_count < policy.threshold {
        return Err(MfkdfError::Quorum {
            required: policy.threshold,
            present: present_count,
        });
    }

    let secret = threshold::combine(&shares, policy.threshold, n)?;
    let kdf_alg = policy.kdf.to_algorithm()?;
    // Step 7 uses the policy-level salt, never a per-factor salt — the
    // source's `get_key_result` passes the last-iterated factor's salt
    // instead, almost certainly a bug (spec.md §9).
    let key = mfkdf_primitives::kdf::kdf(&kdf_alg, &secret, &policy.salt, policy.size)?;

    let mut new_policy = policy.clone();
    for (descriptor, material) in new_policy.factors.iter_mut().zip(materials.iter()) {
        if let Some(material) = material {
            descriptor.params = material.next_params.clone();
        }
    }

    let full_shares = threshold::recover(&shares, policy.threshold, n)?;

    debug!(key_len = key.len(), present = present_count, n, "derivation complete");
    Ok(DerivedKeyBundle::new(new_policy, key.to_vec(), secret, full_shares, outputs))
}

fn derive_slot(
    descriptor: &FactorDescriptor,
    factors: &HashMap<String, FactorInput>,
    present: &HashSet<String>,
) -> Result<Option<Material>> {
    if descriptor.factor_type == FactorType::Stack {
        return derive_stack_slot(descriptor, factors, present);
    }

    let Some(input) = factors.get(&descriptor.id) else {
        return Ok(None);
    };

    let material = match (descriptor.factor_type, input) {
        (FactorType::Password, FactorInput::Password(password)) => factor::password::derive(password)?,
        (FactorType::Question, FactorInput::Question(answer)) => {
            factor::question::derive(answer, &descriptor.params)?
        }
        (FactorType::Hmacsha1, FactorInput::HmacSha1(response)) => {
            let params = parse_params::<factor::hmacsha1::Params>(descriptor)?;
            factor::hmacsha1::derive(&params, response)?
        }
        (FactorType::Hotp, FactorInput::Hotp(code)) => {
            let params = parse_params::<factor::hotp::Params>(descriptor)?;
            factor::hotp::derive(&params, *code)?
        }
        (FactorType::Totp, FactorInput::Totp { code, time }) => {
            let params = parse_params::<factor::totp::Params>(descriptor)?;
            factor::totp::derive(&params, *code, time.unwrap_or_else(now_ms))?
        }
        (FactorType::Persisted, FactorInput::Persisted(data)) => Material {
            data: Zeroizing::new(data.clone()),
            next_params: descriptor.params.clone(),
            output: serde_json::json!({}),
        },
        (factor_type, _) => {
            return Err(MfkdfError::Factor(format!(
                "factor {} declared type {:?} but was given a mismatched input",
                descriptor.id, factor_type
            )))
        }
    };
    debug!(factor_id = %descriptor.id, factor_type = ?descriptor.factor_type, "factor material derived");
    Ok(Some(material))
}

fn derive_stack_slot(
    descriptor: &FactorDescriptor,
    factors: &HashMap<String, FactorInput>,
    present: &HashSet<String>,
) -> Result<Option<Material>> {
    let sub_policy: Policy = serde_json::from_value(descriptor.params.clone()).map_err(|e| {
        MfkdfError::Policy(format!("factor {}: malformed stack params: {e}", descriptor.id))
    })?;
    if !policy::evaluate(&sub_policy, present) {
        return Ok(None);
    }
    let sub_bundle = derive_inner(&sub_policy, factors)?;
    let next_params = serde_json::to_value(&sub_bundle.policy)
        .map_err(|e| MfkdfError::Policy(format!("factor {}: {e}", descriptor.id)))?;
    let output = serde_json::to_value(&sub_bundle.outputs)
        .map_err(|e| MfkdfError::Policy(format!("factor {}: {e}", descriptor.id)))?;
    Ok(Some(Material {
        data: Zeroizing::new(sub_bundle.key.to_vec()),
        next_params,
        output,
    }))
}

fn parse_params<P: serde::de::DeserializeOwned>(descriptor: &FactorDescriptor) -> Result<P> {
    serde_json::from_value(descriptor.params.clone())
        .map_err(|e| MfkdfError::Policy(format!("factor {}: malformed params: {e}", descriptor.id)))
}

fn xor(a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
    if a.len() != b.len() {
        return Err(MfkdfError::Factor(format!(
            "pad length {} does not match share length {}",
            a.len(),
            b.len()
        )));
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect())
}
