use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in crypto operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key wrap failed: {0}")]
    KeyWrap(String),

    /// Deliberately carries no detail: wrong key, tampered ciphertext and
    /// malformed key material must be indistinguishable to the caller.
    #[error("cannot access key material")]
    KeyUnwrap,

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidDigestLength { expected: usize, actual: usize },

    #[error("encoding error: {0}")]
    Encoding(String),
}
