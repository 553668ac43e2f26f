//! Per-file content encryption with the XChaCha20 stream cipher.
//!
//! Deliberately unauthenticated: the cipher is length-preserving and
//! decryption always produces *some* byte sequence. Integrity is
//! established afterwards by the plaintext digest check in [`crate::checksum`].
//!
//! Nonces are generated inside [`encrypt`] and never accepted from
//! callers — nonce reuse under the same key would be a catastrophic
//! confidentiality failure, so the API makes it unrepresentable.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::XChaCha20;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

/// File key size in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// XChaCha20 nonce size in bytes (192 bits).
pub const NONCE_SIZE: usize = 24;

/// A 256-bit symmetric key protecting one file's content.
///
/// Zeroized on drop; never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FileKey {
    bytes: [u8; KEY_SIZE],
}

impl FileKey {
    /// Generates a fresh random key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Reconstructs a key from raw bytes (e.g. after unwrapping).
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Avoid logging or persisting the returned bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FileKey([REDACTED])")
    }
}

/// Encrypts `plaintext` under `key` with a freshly generated random nonce.
///
/// Returns the nonce alongside the ciphertext; the stored blob layout is
/// `nonce || ciphertext`. Ciphertext length equals plaintext length.
pub fn encrypt(plaintext: &[u8], key: &FileKey) -> ([u8; NONCE_SIZE], Vec<u8>) {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let mut ciphertext = plaintext.to_vec();
    let mut cipher = XChaCha20::new(key.as_bytes().into(), (&nonce).into());
    cipher.apply_keystream(&mut ciphertext);

    (nonce, ciphertext)
}

/// Decrypts `ciphertext` under `key` and `nonce`.
///
/// Infallible by construction: a stream cipher keystream XOR always
/// "succeeds". A wrong key or corrupted input yields garbage bytes that
/// the caller's digest check rejects.
pub fn decrypt(nonce: &[u8; NONCE_SIZE], ciphertext: &[u8], key: &FileKey) -> Vec<u8> {
    let mut plaintext = ciphertext.to_vec();
    let mut cipher = XChaCha20::new(key.as_bytes().into(), nonce.into());
    cipher.apply_keystream(&mut plaintext);
    plaintext
}
