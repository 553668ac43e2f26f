//! Principal and sharing directory collaborators.
//!
//! `PrincipalDirectory` is the key-custody seam: the reference
//! implementation holds private keys server-side (the per-user custody
//! model), but the trait lets a deployment swap in client-held keys
//! without touching the envelope protocol.

use std::collections::HashMap;
use std::sync::RwLock;

use strongroom_crypto::keywrap::{Keypair, PublicKey, SecretKey};

use crate::model::{FileId, Principal, PrincipalId, ShareGrant};

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("unknown principal: {0}")]
    UnknownPrincipal(PrincipalId),
    #[error("directory backend failure: {0}")]
    Backend(String),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Supplies principal records and key material on demand.
///
/// Callers must not hold a returned private key beyond the scope of a
/// single open/share operation.
pub trait PrincipalDirectory: Send + Sync {
    fn principal(&self, id: PrincipalId) -> DirectoryResult<Principal>;
    fn public_key(&self, id: PrincipalId) -> DirectoryResult<PublicKey>;
    fn private_key(&self, id: PrincipalId) -> DirectoryResult<SecretKey>;
}

/// Supplies and records share grants.
pub trait ShareDirectory: Send + Sync {
    /// All grants for one file.
    fn grants_for(&self, file: FileId) -> DirectoryResult<Vec<ShareGrant>>;
    /// All grants naming `principal` as grantee.
    fn shared_with(&self, principal: PrincipalId) -> DirectoryResult<Vec<ShareGrant>>;
    fn insert(&self, grant: ShareGrant) -> DirectoryResult<()>;
}

/// In-memory principal directory with server-side key custody.
#[derive(Default)]
pub struct MemoryDirectory {
    principals: RwLock<HashMap<PrincipalId, (Principal, [u8; 32])>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new principal as an explicit two-step sequence:
    /// generate the keypair first, then insert the record. The record
    /// only ever becomes visible with its keys attached, so no seal/open
    /// can observe a principal without a keypair.
    pub fn register(&self, display_name: &str) -> DirectoryResult<Principal> {
        let keypair = Keypair::generate();
        let principal = Principal {
            id: PrincipalId::new(),
            display_name: display_name.to_string(),
            public_key: keypair.public_bytes(),
            created_at: chrono::Utc::now(),
        };

        let mut principals = self
            .principals
            .write()
            .map_err(|e| DirectoryError::Backend(e.to_string()))?;
        principals.insert(principal.id, (principal.clone(), keypair.secret_bytes()));
        Ok(principal)
    }
}

impl PrincipalDirectory for MemoryDirectory {
    fn principal(&self, id: PrincipalId) -> DirectoryResult<Principal> {
        let principals = self
            .principals
            .read()
            .map_err(|e| DirectoryError::Backend(e.to_string()))?;
        principals
            .get(&id)
            .map(|(p, _)| p.clone())
            .ok_or(DirectoryError::UnknownPrincipal(id))
    }

    fn public_key(&self, id: PrincipalId) -> DirectoryResult<PublicKey> {
        self.principal(id).map(|p| PublicKey::from(p.public_key))
    }

    fn private_key(&self, id: PrincipalId) -> DirectoryResult<SecretKey> {
        let principals = self
            .principals
            .read()
            .map_err(|e| DirectoryError::Backend(e.to_string()))?;
        principals
            .get(&id)
            .map(|(_, secret)| SecretKey::from(*secret))
            .ok_or(DirectoryError::UnknownPrincipal(id))
    }
}

/// In-memory share directory.
///
/// Grants are additive; uniqueness per (file, grantee) is deliberately not
/// enforced here. Revocation is a capability of the real backing store.
#[derive(Default)]
pub struct MemoryShareDirectory {
    grants: RwLock<Vec<ShareGrant>>,
}

impl MemoryShareDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShareDirectory for MemoryShareDirectory {
    fn grants_for(&self, file: FileId) -> DirectoryResult<Vec<ShareGrant>> {
        let grants = self
            .grants
            .read()
            .map_err(|e| DirectoryError::Backend(e.to_string()))?;
        Ok(grants.iter().filter(|g| g.file_id == file).cloned().collect())
    }

    fn shared_with(&self, principal: PrincipalId) -> DirectoryResult<Vec<ShareGrant>> {
        let grants = self
            .grants
            .read()
            .map_err(|e| DirectoryError::Backend(e.to_string()))?;
        Ok(grants
            .iter()
            .filter(|g| g.granted_to == principal)
            .cloned()
            .collect())
    }

    fn insert(&self, grant: ShareGrant) -> DirectoryResult<()> {
        let mut grants = self
            .grants
            .write()
            .map_err(|e| DirectoryError::Backend(e.to_string()))?;
        grants.push(grant);
        Ok(())
    }
}
