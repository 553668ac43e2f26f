//! Data model: principals, sealed files, and share grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strongroom_crypto::{ContentDigest, WrappedKey};
use uuid::Uuid;

/// Unique identifier for a principal (vault user).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a sealed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub Uuid);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A vault user. The public key is part of the record; the private key
/// lives only behind the key-custody directory.
///
/// Every principal has exactly one active keypair, generated before the
/// record becomes visible — no principal exists without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub display_name: String,
    /// Raw X25519 public key.
    pub public_key: [u8; 32],
    pub created_at: DateTime<Utc>,
}

/// Advisory permission level on a share grant. The current download path
/// treats any grant as read access; the distinction is reserved for future
/// write-access semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharePermission {
    View,
    Edit,
}

impl fmt::Display for SharePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharePermission::View => write!(f, "view"),
            SharePermission::Edit => write!(f, "edit"),
        }
    }
}

/// One stored document: envelope location plus the metadata needed to
/// open and verify it. Immutable once created — a re-upload mints a new
/// `SealedFile` rather than mutating this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedFile {
    pub id: FileId,
    pub owner: PrincipalId,
    pub original_name: String,
    pub content_type: String,
    /// Plaintext length in bytes.
    pub size: u64,
    /// Opaque blob-store location of the `nonce || ciphertext` blob.
    pub location: String,
    /// SHA-256 digest of the plaintext (never of the ciphertext).
    pub digest: ContentDigest,
    /// File key wrapped under the owner's public key. Stored apart from
    /// the blob so grantee re-wraps never touch the ciphertext.
    pub wrapped_key: WrappedKey,
    pub created_at: DateTime<Utc>,
}

/// Authorization record letting a non-owner open a file.
///
/// Carries its own grantee-specific wrapped key, produced by the owner
/// unwrapping the file key and re-wrapping it under the grantee's public
/// key at share time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareGrant {
    pub file_id: FileId,
    pub granted_by: PrincipalId,
    pub granted_to: PrincipalId,
    pub permission: SharePermission,
    pub wrapped_key: WrappedKey,
    pub created_at: DateTime<Utc>,
}

/// Metadata projection for listings and search results.
///
/// Never carries key material or digests.
#[derive(Debug, Clone, Serialize)]
pub struct FileListing {
    pub id: FileId,
    pub owner: PrincipalId,
    pub original_name: String,
    pub content_type: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

impl From<&SealedFile> for FileListing {
    fn from(f: &SealedFile) -> Self {
        Self {
            id: f.id,
            owner: f.owner,
            original_name: f.original_name.clone(),
            content_type: f.content_type.clone(),
            size: f.size,
            created_at: f.created_at,
        }
    }
}

/// A decrypted download, held transiently and never persisted.
#[derive(Debug)]
pub struct DownloadedFile {
    pub original_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}
