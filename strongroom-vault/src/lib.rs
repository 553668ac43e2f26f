//! Multi-tenant encrypted document vault.
//!
//! Each principal owns an X25519 keypair; each uploaded file is protected
//! by a freshly generated symmetric key that is wrapped under the owner's
//! public key and, on sharing, re-wrapped per grantee. Content integrity
//! is a SHA-256 digest of the plaintext, re-validated on every download.
//!
//! # Architecture
//!
//! - [`envelope`] — seal/open protocol over the `strongroom-crypto`
//!   primitives; the stored blob is `nonce || ciphertext`, with the
//!   wrapped key and digest in metadata.
//! - [`access`] — pure ALLOW/DENY decision naming the wrapped-key variant
//!   to use (owner's own, or the grantee-specific one from a share grant).
//! - [`service`] — the [`DocumentVault`] wiring upload/download/share to
//!   the storage, directory, and audit collaborators.
//! - [`directory`] / [`audit`] — collaborator traits with in-memory
//!   reference implementations.
//!
//! Envelopes are immutable once created; re-uploading a document creates
//! a new sealed file. Raw keys and decrypted plaintext are zeroized as
//! soon as their operation completes and are never written to disk.

pub mod access;
pub mod audit;
pub mod config;
pub mod directory;
pub mod envelope;
mod error;
pub mod model;
pub mod service;

pub use access::{decide_access, AccessDecision};
pub use audit::{AuditAction, AuditError, AuditEvent, AuditOutcome, AuditSink, MemoryAuditLog};
pub use config::VaultConfig;
pub use directory::{
    DirectoryError, MemoryDirectory, MemoryShareDirectory, PrincipalDirectory, ShareDirectory,
};
pub use envelope::{open, seal, Envelope, Sealed};
pub use error::{VaultError, VaultResult};
pub use model::{
    DownloadedFile, FileId, FileListing, Principal, PrincipalId, SealedFile, ShareGrant,
    SharePermission,
};
pub use service::{ContentStore, DocumentVault};
