//! The envelope protocol: `seal` for storage, `open` for retrieval.
//!
//! An envelope is the stored `nonce || ciphertext` pair for one file's
//! content. The wrapped key and the plaintext digest live in metadata,
//! not in the blob, so re-wrapping the key for a new grantee never
//! rewrites stored content.

use serde::{Deserialize, Serialize};
use strongroom_crypto::keywrap::{self, PublicKey, SecretKey, WrappedKey};
use strongroom_crypto::{checksum, cipher, ContentDigest, FileKey, NONCE_SIZE};
use zeroize::Zeroize;

use crate::error::{VaultError, VaultResult};

/// Stored representation of one file's protected content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Persisted blob layout: `nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(NONCE_SIZE + self.ciphertext.len());
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.ciphertext);
        buf
    }

    /// Parses a stored blob. A blob shorter than one nonce is corrupt.
    pub fn from_bytes(blob: &[u8]) -> VaultResult<Self> {
        if blob.len() < NONCE_SIZE {
            return Err(VaultError::Envelope(format!(
                "blob too short for nonce: {} bytes",
                blob.len()
            )));
        }
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&blob[..NONCE_SIZE]);
        Ok(Self {
            nonce,
            ciphertext: blob[NONCE_SIZE..].to_vec(),
        })
    }
}

/// Everything `seal` produces: the envelope plus the metadata stored
/// alongside it.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub envelope: Envelope,
    pub wrapped_key: WrappedKey,
    pub digest: ContentDigest,
}

/// Seals `plaintext` for the holder of `owner_pk`.
///
/// Digest over plaintext, fresh file key, encrypt, wrap. The raw file key
/// is zeroized when this function returns; nothing intermediate persists.
pub fn seal(plaintext: &[u8], owner_pk: &PublicKey) -> VaultResult<Sealed> {
    let digest = checksum::digest(plaintext);

    let key = FileKey::generate();
    let (nonce, ciphertext) = cipher::encrypt(plaintext, &key);
    let wrapped_key = keywrap::wrap_key(&key, owner_pk)?;

    Ok(Sealed {
        envelope: Envelope { nonce, ciphertext },
        wrapped_key,
        digest,
    })
}

/// Opens an envelope for the holder of `recipient_sk`.
///
/// Stage order is mandatory — unwrap, then decrypt, then verify — and
/// each stage's failure short-circuits the rest:
///
/// - unwrap failure propagates as [`VaultError::KeyUnwrap`];
/// - decryption cannot fail (stream cipher);
/// - a digest mismatch zeroizes and discards the plaintext and returns
///   [`VaultError::IntegrityViolation`] — tampered content is never
///   handed back, even partially.
pub fn open(
    envelope: &Envelope,
    wrapped_key: &WrappedKey,
    recipient_sk: &SecretKey,
    expected_digest: &ContentDigest,
) -> VaultResult<Vec<u8>> {
    let key = keywrap::unwrap_key(wrapped_key, recipient_sk)?;

    let mut plaintext = cipher::decrypt(&envelope.nonce, &envelope.ciphertext, &key);

    if !checksum::verify(&plaintext, expected_digest) {
        plaintext.zeroize();
        return Err(VaultError::IntegrityViolation);
    }

    Ok(plaintext)
}
