//! Per-principal keypairs and file-key wrapping.
//!
//! Uses X25519 key exchange + XSalsa20-Poly1305 to wrap a file's symmetric
//! key under a principal's public key. Each wrap generates an ephemeral
//! keypair and a fresh nonce, so wrapping is randomized: two wraps of the
//! same key never produce the same bytes, and the output length depends
//! only on the scheme, not on key content.
//!
//! Unwrap failures are uniform by design — a wrong private key and a
//! tampered wrapped key produce the identical [`CryptoError::KeyUnwrap`],
//! leaving no oracle for an attacker to distinguish causes.

use crate::cipher::{FileKey, KEY_SIZE};
use crate::error::{CryptoError, CryptoResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use crypto_box::aead::Aead;
use crypto_box::SalsaBox;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

pub use crypto_box::{PublicKey, SecretKey};

/// Wrap nonce size in bytes (XSalsa20).
const WRAP_NONCE_SIZE: usize = 24;

/// An X25519 keypair held by one principal for its lifetime.
///
/// The secret key zeroizes itself on drop (from `crypto_box`).
pub struct Keypair {
    pub secret: SecretKey,
    pub public: PublicKey,
}

impl Keypair {
    /// Generates a fresh keypair from the OS CSPRNG.
    ///
    /// Called exactly once per principal, before the principal record
    /// becomes visible to any other operation.
    pub fn generate() -> Self {
        let secret = SecretKey::generate(&mut OsRng);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Returns the public key as a raw 32-byte array.
    pub fn public_bytes(&self) -> [u8; 32] {
        *self.public.as_bytes()
    }

    /// Returns the secret key as a raw 32-byte array.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes()
    }

    /// Reconstructs a keypair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        let secret = SecretKey::from(bytes);
        let public = secret.public_key();
        Self { secret, public }
    }
}

/// A file key encrypted under one recipient's public key.
///
/// Stored as a metadata field next to the file record — never inside the
/// content blob — so re-wrapping for a new grantee leaves the stored
/// ciphertext untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WrappedKey {
    /// Ephemeral X25519 public key (sender side of the DH exchange).
    pub ephemeral_public_key: [u8; 32],
    /// XSalsa20 nonce.
    pub nonce: [u8; WRAP_NONCE_SIZE],
    /// Encrypted file key (ciphertext + Poly1305 tag).
    pub ciphertext: Vec<u8>,
}

impl WrappedKey {
    /// Compact base64 form for metadata storage:
    /// `ephemeral_public_key || nonce || ciphertext`.
    pub fn encode(&self) -> String {
        let mut buf = Vec::with_capacity(32 + WRAP_NONCE_SIZE + self.ciphertext.len());
        buf.extend_from_slice(&self.ephemeral_public_key);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.ciphertext);
        BASE64.encode(buf)
    }

    pub fn decode(s: &str) -> CryptoResult<Self> {
        let raw = BASE64
            .decode(s)
            .map_err(|e| CryptoError::Encoding(format!("wrapped key base64: {e}")))?;
        if raw.len() < 32 + WRAP_NONCE_SIZE {
            return Err(CryptoError::Encoding(format!(
                "wrapped key too short: {} bytes",
                raw.len()
            )));
        }
        let mut ephemeral_public_key = [0u8; 32];
        ephemeral_public_key.copy_from_slice(&raw[..32]);
        let mut nonce = [0u8; WRAP_NONCE_SIZE];
        nonce.copy_from_slice(&raw[32..32 + WRAP_NONCE_SIZE]);
        Ok(Self {
            ephemeral_public_key,
            nonce,
            ciphertext: raw[32 + WRAP_NONCE_SIZE..].to_vec(),
        })
    }
}

/// Wraps a file key under `recipient_pk`.
///
/// An ephemeral X25519 keypair is generated per call, so the output is
/// randomized and reveals nothing about the wrapped key.
pub fn wrap_key(key: &FileKey, recipient_pk: &PublicKey) -> CryptoResult<WrappedKey> {
    let ephemeral = SecretKey::generate(&mut OsRng);
    let ephemeral_pk = ephemeral.public_key();

    let salsa_box = SalsaBox::new(recipient_pk, &ephemeral);

    let mut nonce = [0u8; WRAP_NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = salsa_box
        .encrypt(crypto_box::Nonce::from_slice(&nonce), key.as_bytes().as_slice())
        .map_err(|e| CryptoError::KeyWrap(format!("key wrap failed: {e}")))?;

    Ok(WrappedKey {
        ephemeral_public_key: *ephemeral_pk.as_bytes(),
        nonce,
        ciphertext,
    })
}

/// Unwraps a file key with `recipient_sk`.
///
/// All failure modes collapse to [`CryptoError::KeyUnwrap`].
pub fn unwrap_key(wrapped: &WrappedKey, recipient_sk: &SecretKey) -> CryptoResult<FileKey> {
    let ephemeral_pk = PublicKey::from(wrapped.ephemeral_public_key);
    let salsa_box = SalsaBox::new(&ephemeral_pk, recipient_sk);

    let plaintext = Zeroizing::new(
        salsa_box
            .decrypt(
                crypto_box::Nonce::from_slice(&wrapped.nonce),
                wrapped.ciphertext.as_ref(),
            )
            .map_err(|_| CryptoError::KeyUnwrap)?,
    );

    if plaintext.len() != KEY_SIZE {
        return Err(CryptoError::KeyUnwrap);
    }
    FileKey::from_bytes(&plaintext).map_err(|_| CryptoError::KeyUnwrap)
}
