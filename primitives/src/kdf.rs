//! Key derivation function dispatch: PBKDF2, bcrypt, scrypt, Argon2i/d/id, HKDF.
//!
//! Mirrors the uniform `kdf(input, salt, size, cfg)` adapter described in
//! the MFKDF core spec. Each algorithm is configured independently of the
//! others; the caller selects one via [`KdfAlgorithm`].

use argon2::{Algorithm, Argon2, Params, Version};
use pbkdf2::pbkdf2_hmac;
use sha2::{Digest as Sha2Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{PrimitiveError, Result};
use crate::hash::Digest;

/// A tagged KDF configuration, one variant per algorithm family supported
/// by the MFKDF policy document's `kdf.type` field.
#[derive(Debug, Clone)]
pub enum KdfAlgorithm {
    /// PBKDF2-HMAC with the given digest.
    Pbkdf2 {
        /// iteration count
        rounds: u32,
        /// underlying HMAC digest
        digest: Digest,
    },
    /// bcrypt, stretched to arbitrary output length with a PBKDF2 pass.
    Bcrypt {
        /// bcrypt cost factor (log2 of iteration count)
        rounds: u32,
    },
    /// scrypt.
    Scrypt {
        /// CPU/memory cost parameter N
        rounds: u32,
        /// block size parameter r
        blocksize: u32,
        /// parallelization parameter p
        parallelism: u32,
    },
    /// Argon2i (data-independent memory access).
    Argon2i {
        /// time cost (iterations)
        rounds: u32,
        /// memory cost in KiB
        memory: u32,
        /// parallelism
        parallelism: u32,
    },
    /// Argon2d (data-dependent memory access).
    Argon2d {
        /// time cost (iterations)
        rounds: u32,
        /// memory cost in KiB
        memory: u32,
        /// parallelism
        parallelism: u32,
    },
    /// Argon2id (hybrid, OWASP default).
    Argon2id {
        /// time cost (iterations)
        rounds: u32,
        /// memory cost in KiB
        memory: u32,
        /// parallelism
        parallelism: u32,
    },
    /// HKDF used directly as a KDF (no PBKDF-style stretching).
    Hkdf {
        /// underlying hash
        digest: Digest,
    },
}

/// Derive `size` bytes of key material from `input` and `salt` using `alg`.
pub fn kdf(alg: &KdfAlgorithm, input: &[u8], salt: &[u8], size: usize) -> Result<Zeroizing<Vec<u8>>> {
    debug!(algorithm = ?alg, size, "deriving key");
    match alg {
        KdfAlgorithm::Pbkdf2 { rounds, digest } => pbkdf2_derive(*digest, input, salt, *rounds, size),
        KdfAlgorithm::Bcrypt { rounds } => bcrypt_derive(input, salt, *rounds, size),
        KdfAlgorithm::Scrypt {
            rounds,
            blocksize,
            parallelism,
        } => scrypt_derive(input, salt, *rounds, *blocksize, *parallelism, size),
        KdfAlgorithm::Argon2i {
            rounds,
            memory,
            parallelism,
        } => argon2_derive(Algorithm::Argon2i, input, salt, *rounds, *memory, *parallelism, size),
        KdfAlgorithm::Argon2d {
            rounds,
            memory,
            parallelism,
        } => argon2_derive(Algorithm::Argon2d, input, salt, *rounds, *memory, *parallelism, size),
        KdfAlgorithm::Argon2id {
            rounds,
            memory,
            parallelism,
        } => argon2_derive(Algorithm::Argon2id, input, salt, *rounds, *memory, *parallelism, size),
        KdfAlgorithm::Hkdf { digest } => crate::hash::hkdf(*digest, input, salt, b"", size),
    }
}

fn pbkdf2_derive(
    digest: Digest,
    input: &[u8],
    salt: &[u8],
    rounds: u32,
    size: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let mut out = Zeroizing::new(vec![0u8; size]);
    match digest {
        Digest::Sha1 => pbkdf2_hmac::<sha1::Sha1>(input, salt, rounds, &mut out),
        Digest::Sha256 => pbkdf2_hmac::<sha2::Sha256>(input, salt, rounds, &mut out),
        Digest::Sha384 => pbkdf2_hmac::<sha2::Sha384>(input, salt, rounds, &mut out),
        Digest::Sha512 => pbkdf2_hmac::<sha2::Sha512>(input, salt, rounds, &mut out),
    }
    Ok(out)
}

/// bcrypt per the core spec: reduce `input`/`salt` to 32-byte SHA-256
/// digests, bcrypt the input digest under a 16-byte salt derived from the
/// salt digest, then stretch the raw bcrypt output to `size` bytes with a
/// single PBKDF2-HMAC-SHA256 pass. The Rust `bcrypt` crate takes a raw
/// 16-byte salt rather than the base64 salt string the JS/Python
/// reference formats use, so the salt digest is truncated to 16 bytes
/// instead of base64-armored.
fn bcrypt_derive(input: &[u8], salt: &[u8], rounds: u32, size: usize) -> Result<Zeroizing<Vec<u8>>> {
    let input_digest = Sha256::digest(input);
    let salt_digest = Sha256::digest(salt);
    let mut salt16 = [0u8; 16];
    salt16.copy_from_slice(&salt_digest[..16]);

    let cost = rounds;
    let raw = bcrypt::bcrypt(cost, salt16, &input_digest);

    let mut out = Zeroizing::new(vec![0u8; size]);
    pbkdf2_hmac::<Sha256>(&raw, &salt_digest, 1, &mut out);
    Ok(out)
}

fn scrypt_derive(
    input: &[u8],
    salt: &[u8],
    n: u32,
    r: u32,
    p: u32,
    size: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let log_n = (n as f64).log2().round() as u8;
    let params = scrypt::Params::new(log_n, r, p, size)
        .map_err(|e| PrimitiveError::ScryptParams(e.to_string()))?;
    let mut out = Zeroizing::new(vec![0u8; size]);
    scrypt::scrypt(input, salt, &params, &mut out)
        .map_err(|e| PrimitiveError::ScryptParams(e.to_string()))?;
    Ok(out)
}

fn argon2_derive(
    variant: Algorithm,
    input: &[u8],
    salt: &[u8],
    rounds: u32,
    memory: u32,
    parallelism: u32,
    size: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let params = Params::new(memory, rounds, parallelism, Some(size))
        .map_err(|e| PrimitiveError::Argon2Params(e.to_string()))?;
    let argon2 = Argon2::new(variant, Version::V0x13, params);
    let mut out = Zeroizing::new(vec![0u8; size]);
    argon2
        .hash_password_into(input, salt, &mut out)
        .map_err(|e| PrimitiveError::Argon2Params(e.to_string()))?;
    Ok(out)
}
