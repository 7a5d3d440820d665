//! Digest-generic HMAC and HKDF (RFC 5869) adapters.

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::error::{PrimitiveError, Result};

/// Hash functions pluggable into HMAC/HKDF/OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digest {
    /// SHA-1 (required for Google Authenticator-compatible HOTP/TOTP).
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl Digest {
    /// Parse a digest name as used in policy `params`/`kdf` JSON documents.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            other => Err(PrimitiveError::UnsupportedDigest(other.to_string())),
        }
    }
}

/// `HMAC(digest, key, msg) -> bytes`.
pub fn hmac(digest: Digest, key: &[u8], msg: &[u8]) -> Result<Vec<u8>> {
    Ok(match digest {
        Digest::Sha1 => {
            let mut mac = Hmac::<Sha1>::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(msg);
            mac.finalize().into_bytes().to_vec()
        }
        Digest::Sha256 => {
            let mut mac =
                Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(msg);
            mac.finalize().into_bytes().to_vec()
        }
        Digest::Sha384 => {
            let mut mac =
                Hmac::<Sha384>::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(msg);
            mac.finalize().into_bytes().to_vec()
        }
        Digest::Sha512 => {
            let mut mac =
                Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(msg);
            mac.finalize().into_bytes().to_vec()
        }
    })
}

/// `HKDF(digest, ikm, salt, info, size) -> bytes[size]`, per RFC 5869.
pub fn hkdf(
    digest: Digest,
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    size: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let salt = if salt.is_empty() { None } else { Some(salt) };
    let mut okm = vec![0u8; size];
    match digest {
        Digest::Sha1 => Hkdf::<Sha1>::new(salt, ikm)
            .expand(info, &mut okm)
            .map_err(|_| PrimitiveError::HkdfExpand)?,
        Digest::Sha256 => Hkdf::<Sha256>::new(salt, ikm)
            .expand(info, &mut okm)
            .map_err(|_| PrimitiveError::HkdfExpand)?,
        Digest::Sha384 => Hkdf::<Sha384>::new(salt, ikm)
            .expand(info, &mut okm)
            .map_err(|_| PrimitiveError::HkdfExpand)?,
        Digest::Sha512 => Hkdf::<Sha512>::new(salt, ikm)
            .expand(info, &mut okm)
            .map_err(|_| PrimitiveError::HkdfExpand)?,
    }
    Ok(Zeroizing::new(okm))
}
