//! Encryption primitives for the strongroom document vault.
//!
//! Every stored file is protected by hybrid envelope encryption:
//!
//! 1. **Content**: encrypted with a fresh random 256-bit file key using
//!    XChaCha20. The stream cipher is length-preserving and carries no
//!    authentication tag — integrity is established separately by a
//!    SHA-256 digest of the plaintext (see [`checksum`]).
//! 2. **File key**: wrapped for each recipient with an ephemeral X25519
//!    key exchange + XSalsa20-Poly1305 sealed envelope (see [`keywrap`]).
//!    Each wrap is randomized, so wrapping the same key twice never
//!    produces the same bytes.
//!
//! Raw key material is zeroized on drop. Digest comparisons are
//! constant-time via `subtle`.

pub mod checksum;
pub mod cipher;
mod error;
pub mod keywrap;

pub use checksum::{digest, verify, ContentDigest, DIGEST_SIZE};
pub use cipher::{decrypt, encrypt, FileKey, KEY_SIZE, NONCE_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use keywrap::{unwrap_key, wrap_key, Keypair, PublicKey, SecretKey, WrappedKey};
