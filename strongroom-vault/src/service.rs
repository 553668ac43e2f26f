//! The document vault service: upload, download, share, list, search.
//!
//! Wires the envelope protocol and the access decision function to the
//! storage, directory, and audit collaborators. Boundary validation
//! (content type, size) happens here so malformed input never reaches the
//! core; denial responses are uniform so they cannot be used as an
//! existence oracle.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use strongroom_blobstore::{BlobStore, BlobStoreError};
use strongroom_crypto::keywrap;
use tracing::{info, warn};

use crate::access::{decide_access, AccessDecision};
use crate::audit::{AuditAction, AuditEvent, AuditOutcome, AuditSink};
use crate::config::VaultConfig;
use crate::directory::{DirectoryError, PrincipalDirectory, ShareDirectory};
use crate::envelope::{self, Envelope};
use crate::error::{VaultError, VaultResult};
use crate::model::{
    DownloadedFile, FileId, FileListing, PrincipalId, SealedFile, ShareGrant, SharePermission,
};

/// Storage collaborator: opaque-location content bytes.
pub trait ContentStore: Send + Sync {
    fn write(&self, data: &[u8]) -> Result<String, BlobStoreError>;
    fn read(&self, location: &str) -> Result<Vec<u8>, BlobStoreError>;
}

impl ContentStore for BlobStore {
    fn write(&self, data: &[u8]) -> Result<String, BlobStoreError> {
        BlobStore::write(self, data)
    }

    fn read(&self, location: &str) -> Result<Vec<u8>, BlobStoreError> {
        BlobStore::read(self, location)
    }
}

/// Multi-tenant encrypted document vault.
///
/// Seal/open operations are independent and stateless beyond a
/// principal's keypair and a file's envelope; the sealed-file index is
/// insert-only behind an `RwLock`, so downloads of different (or the
/// same) file run concurrently.
pub struct DocumentVault {
    config: VaultConfig,
    store: Arc<dyn ContentStore>,
    principals: Arc<dyn PrincipalDirectory>,
    shares: Arc<dyn ShareDirectory>,
    audit: Arc<dyn AuditSink>,
    files: RwLock<HashMap<FileId, SealedFile>>,
}

impl DocumentVault {
    pub fn new(
        config: VaultConfig,
        store: Arc<dyn ContentStore>,
        principals: Arc<dyn PrincipalDirectory>,
        shares: Arc<dyn ShareDirectory>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            config,
            store,
            principals,
            shares,
            audit,
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Convenience constructor that opens a filesystem blob store at the
    /// configured storage root.
    pub fn open(
        config: VaultConfig,
        principals: Arc<dyn PrincipalDirectory>,
        shares: Arc<dyn ShareDirectory>,
        audit: Arc<dyn AuditSink>,
    ) -> VaultResult<Self> {
        let store = Arc::new(BlobStore::open(&config.storage_root)?);
        Ok(Self::new(config, store, principals, shares, audit))
    }

    /// Encrypts and stores a document for `owner`.
    ///
    /// Plaintext is never persisted: it is digested, sealed, and only the
    /// `nonce || ciphertext` blob reaches storage.
    pub fn upload(
        &self,
        owner: PrincipalId,
        original_name: &str,
        content_type: &str,
        content: &[u8],
    ) -> VaultResult<SealedFile> {
        self.validate_upload(content_type, content.len())?;

        let owner_pk = self.principals.public_key(owner).map_err(map_directory)?;
        let sealed = envelope::seal(content, &owner_pk)?;
        let location = self.store.write(&sealed.envelope.to_bytes())?;

        let file = SealedFile {
            id: FileId::new(),
            owner,
            original_name: original_name.to_string(),
            content_type: content_type.to_string(),
            size: content.len() as u64,
            location,
            digest: sealed.digest,
            wrapped_key: sealed.wrapped_key,
            created_at: Utc::now(),
        };
        self.files.write().unwrap().insert(file.id, file.clone());

        info!(file = %file.id, %owner, size = file.size, "document sealed and stored");
        self.record_audit(AuditEvent::new(
            owner,
            AuditAction::Upload,
            Some(file.id),
            AuditOutcome::Success,
            format!("uploaded {} ({} bytes)", file.original_name, file.size),
        ));
        Ok(file)
    }

    /// Authorizes, unwraps, decrypts, and verifies one document for
    /// `requester`.
    ///
    /// An unknown file id and a missing grant return the same
    /// [`VaultError::AccessDenied`]; both are audited.
    pub fn download(&self, requester: PrincipalId, file_id: FileId) -> VaultResult<DownloadedFile> {
        let Some(file) = self.lookup(file_id) else {
            return Err(self.deny(requester, file_id, "no such file"));
        };

        let grants = self.shares.grants_for(file_id).map_err(map_directory)?;
        let wrapped_key = match decide_access(requester, &file, &grants) {
            AccessDecision::AllowOwner(key) => key.clone(),
            AccessDecision::AllowGrant(grant) => grant.wrapped_key.clone(),
            AccessDecision::Deny => {
                return Err(self.deny(requester, file_id, "not owner, no grant"));
            }
        };

        // Private key is scoped to this call and dropped with it.
        let secret = self.principals.private_key(requester).map_err(map_directory)?;

        let blob = self.store.read(&file.location)?;
        let envelope = Envelope::from_bytes(&blob)?;

        let content = match envelope::open(&envelope, &wrapped_key, &secret, &file.digest) {
            Ok(plaintext) => plaintext,
            Err(e @ VaultError::KeyUnwrap) => {
                self.record_audit(AuditEvent::new(
                    requester,
                    AuditAction::KeyUnwrapFailed,
                    Some(file_id),
                    AuditOutcome::Failure,
                    "could not unwrap file key",
                ));
                return Err(e);
            }
            Err(e @ VaultError::IntegrityViolation) => {
                warn!(file = %file_id, %requester, "integrity check failed on download");
                self.record_audit(AuditEvent::new(
                    requester,
                    AuditAction::IntegrityCheckFailed,
                    Some(file_id),
                    AuditOutcome::Failure,
                    format!("checksum mismatch for {}", file.original_name),
                ));
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        self.record_audit(AuditEvent::new(
            requester,
            AuditAction::Download,
            Some(file_id),
            AuditOutcome::Success,
            format!("downloaded {}", file.original_name),
        ));
        Ok(DownloadedFile {
            original_name: file.original_name,
            content_type: file.content_type,
            content,
        })
    }

    /// Grants `grantee` read access to a file by re-wrapping its key.
    ///
    /// Owner-only. The file key is unwrapped with the grantor's private
    /// key and immediately re-wrapped under the grantee's public key; the
    /// stored ciphertext is never touched, and the raw key is zeroized
    /// when this call returns.
    pub fn share(
        &self,
        grantor: PrincipalId,
        file_id: FileId,
        grantee: PrincipalId,
        permission: SharePermission,
    ) -> VaultResult<ShareGrant> {
        let Some(file) = self.lookup(file_id) else {
            return Err(self.deny(grantor, file_id, "no such file"));
        };
        if file.owner != grantor {
            return Err(self.deny(grantor, file_id, "only the owner may share"));
        }

        let grantee_pk = match self.principals.public_key(grantee) {
            Ok(pk) => pk,
            Err(DirectoryError::UnknownPrincipal(id)) => {
                return Err(VaultError::Validation(format!("unknown grantee: {id}")));
            }
            Err(e) => return Err(map_directory(e)),
        };
        let grantor_sk = self.principals.private_key(grantor).map_err(map_directory)?;

        let file_key = keywrap::unwrap_key(&file.wrapped_key, &grantor_sk)?;
        let wrapped_key = keywrap::wrap_key(&file_key, &grantee_pk)?;

        let grant = ShareGrant {
            file_id,
            granted_by: grantor,
            granted_to: grantee,
            permission,
            wrapped_key,
            created_at: Utc::now(),
        };
        self.shares.insert(grant.clone()).map_err(map_directory)?;

        info!(file = %file_id, %grantor, %grantee, %permission, "share grant created");
        self.record_audit(AuditEvent::new(
            grantor,
            AuditAction::Share,
            Some(file_id),
            AuditOutcome::Success,
            format!("shared {} with {grantee} ({permission})", file.original_name),
        ));
        Ok(grant)
    }

    /// Metadata for one file, subject to the same access decision as a
    /// download.
    pub fn file_metadata(
        &self,
        requester: PrincipalId,
        file_id: FileId,
    ) -> VaultResult<FileListing> {
        let Some(file) = self.lookup(file_id) else {
            return Err(self.deny(requester, file_id, "no such file"));
        };
        let grants = self.shares.grants_for(file_id).map_err(map_directory)?;
        if !decide_access(requester, &file, &grants).is_allowed() {
            return Err(self.deny(requester, file_id, "not owner, no grant"));
        }
        Ok(FileListing::from(&file))
    }

    /// Files owned by `owner`, newest first.
    pub fn list_owned(&self, owner: PrincipalId) -> Vec<FileListing> {
        let files = self.files.read().unwrap();
        let mut listings: Vec<FileListing> = files
            .values()
            .filter(|f| f.owner == owner)
            .map(FileListing::from)
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        listings
    }

    /// Files shared with `principal`, newest grant first.
    pub fn shared_with_me(&self, principal: PrincipalId) -> VaultResult<Vec<FileListing>> {
        let grants = self.shares.shared_with(principal).map_err(map_directory)?;
        let files = self.files.read().unwrap();
        let mut listings: Vec<FileListing> = grants
            .iter()
            .filter_map(|g| files.get(&g.file_id))
            .map(FileListing::from)
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        listings.dedup_by_key(|l| l.id);
        Ok(listings)
    }

    /// Case-insensitive substring search over the names of files the
    /// principal owns or has been granted, newest first.
    pub fn search(&self, principal: PrincipalId, query: &str) -> VaultResult<Vec<FileListing>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();

        let mut results = self.list_owned(principal);
        results.extend(self.shared_with_me(principal)?);
        results.retain(|l| l.original_name.to_lowercase().contains(&needle));
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results.dedup_by_key(|l| l.id);
        Ok(results)
    }

    fn validate_upload(&self, content_type: &str, size: usize) -> VaultResult<()> {
        if size as u64 > self.config.max_file_size {
            return Err(VaultError::Validation(format!(
                "file too large: {size} bytes (max {})",
                self.config.max_file_size
            )));
        }
        if !self.config.allowed_content_types.is_empty()
            && !self
                .config
                .allowed_content_types
                .iter()
                .any(|t| t == content_type)
        {
            warn!(%content_type, "upload blocked: content type not allowed");
            return Err(VaultError::Validation(format!(
                "content type not allowed: {content_type}"
            )));
        }
        Ok(())
    }

    fn lookup(&self, file_id: FileId) -> Option<SealedFile> {
        self.files.read().unwrap().get(&file_id).cloned()
    }

    /// Audits a denial and returns the uniform error.
    fn deny(&self, requester: PrincipalId, file_id: FileId, detail: &str) -> VaultError {
        self.record_audit(AuditEvent::new(
            requester,
            AuditAction::AccessDenied,
            Some(file_id),
            AuditOutcome::Failure,
            detail,
        ));
        VaultError::AccessDenied
    }

    /// Fire-and-forget: a failing audit sink is logged, never fatal.
    fn record_audit(&self, event: AuditEvent) {
        if let Err(e) = self.audit.record(event) {
            warn!("audit sink failure: {e}");
        }
    }
}

fn map_directory(e: DirectoryError) -> VaultError {
    VaultError::Directory(e.to_string())
}
