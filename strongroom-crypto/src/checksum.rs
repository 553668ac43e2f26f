//! Plaintext tamper detection via SHA-256 digests.
//!
//! The digest is always computed over plaintext, never ciphertext: the
//! download path decrypts first and then re-validates, so any corruption
//! of the stored blob (nonce or ciphertext) shows up as a digest mismatch.
//! Comparisons are constant-time — plaintext content never influences how
//! far a comparison gets.

use crate::error::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Digest size in bytes (256 bits).
pub const DIGEST_SIZE: usize = 32;

/// A 256-bit SHA-256 digest of file plaintext.
#[derive(Clone, Serialize, Deserialize)]
pub struct ContentDigest([u8; DIGEST_SIZE]);

impl ContentDigest {
    /// Reconstructs a digest from raw bytes (e.g. a metadata column).
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != DIGEST_SIZE {
            return Err(CryptoError::InvalidDigestLength {
                expected: DIGEST_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; DIGEST_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Lowercase hex form, as stored by the metadata layer and audit logs.
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(DIGEST_SIZE * 2);
        for byte in &self.0 {
            s.push_str(&format!("{byte:02x}"));
        }
        s
    }

    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        if s.len() != DIGEST_SIZE * 2 {
            return Err(CryptoError::InvalidDigestLength {
                expected: DIGEST_SIZE * 2,
                actual: s.len(),
            });
        }
        let mut bytes = [0u8; DIGEST_SIZE];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| CryptoError::Encoding("invalid UTF-8 in hex digest".to_string()))?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| {
                CryptoError::Encoding(format!("invalid hex character at position {}", i * 2))
            })?;
        }
        Ok(Self(bytes))
    }
}

impl ConstantTimeEq for ContentDigest {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for ContentDigest {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for ContentDigest {}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

/// Computes the SHA-256 digest of `data`. Deterministic, no side effects.
pub fn digest(data: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; DIGEST_SIZE];
    bytes.copy_from_slice(&hash);
    ContentDigest(bytes)
}

/// Recomputes the digest of `data` and compares it in constant time.
pub fn verify(data: &[u8], expected: &ContentDigest) -> bool {
    digest(data) == *expected
}
