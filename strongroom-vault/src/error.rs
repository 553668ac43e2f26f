//! Vault error types.

use strongroom_blobstore::BlobStoreError;
use strongroom_crypto::CryptoError;
use thiserror::Error;

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors surfaced by the document vault.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Boundary rejection (unsupported content type, oversize upload).
    /// Never produced by the envelope protocol itself.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Uniform denial: returned both when the requester lacks a grant and
    /// when the file id does not exist, so denial is not an existence oracle.
    #[error("access denied")]
    AccessDenied,

    /// Generic key-material failure. Does not reveal whether the key, the
    /// wrapped ciphertext, or the requester identity was at fault.
    #[error("cannot access key material")]
    KeyUnwrap,

    /// The decrypted content did not match the stored digest — possible
    /// tampering or storage corruption. Always paired with an audit event.
    #[error("content integrity check failed")]
    IntegrityViolation,

    /// The stored blob is structurally malformed (e.g. shorter than a nonce).
    #[error("malformed envelope: {0}")]
    Envelope(String),

    /// Storage-layer failure; fatal for the current request, no retries here.
    #[error("storage error: {0}")]
    Storage(#[from] BlobStoreError),

    #[error("directory error: {0}")]
    Directory(String),

    #[error("crypto error: {0}")]
    Crypto(String),
}

impl From<CryptoError> for VaultError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::KeyUnwrap => VaultError::KeyUnwrap,
            other => VaultError::Crypto(other.to_string()),
        }
    }
}
