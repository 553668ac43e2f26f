//! The access decision function.
//!
//! Pure and state-free: the requester identity is an explicit parameter,
//! never read from ambient request context. The decision names which
//! wrapped-key variant the caller must use, since the owner's wrapped key
//! is useless to a grantee and vice versa.

use strongroom_crypto::WrappedKey;

use crate::model::{PrincipalId, SealedFile, ShareGrant};

/// Outcome of an authorization check for one (requester, file) pair.
#[derive(Debug)]
pub enum AccessDecision<'a> {
    /// Requester owns the file: use the owner's wrapped key.
    AllowOwner(&'a WrappedKey),
    /// Requester holds a grant: use the grantee-specific wrapped key.
    AllowGrant(&'a ShareGrant),
    /// Not owner, no grant. The caller must audit this before returning.
    Deny,
}

impl AccessDecision<'_> {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, AccessDecision::Deny)
    }
}

/// Decides whether `requester` may open `file`.
///
/// The owner is always allowed. A grantee is allowed iff some grant names
/// them for this file — the permission level is advisory metadata and does
/// not affect read access.
pub fn decide_access<'a>(
    requester: PrincipalId,
    file: &'a SealedFile,
    grants: &'a [ShareGrant],
) -> AccessDecision<'a> {
    if requester == file.owner {
        return AccessDecision::AllowOwner(&file.wrapped_key);
    }
    match grants
        .iter()
        .find(|g| g.file_id == file.id && g.granted_to == requester)
    {
        Some(grant) => AccessDecision::AllowGrant(grant),
        None => AccessDecision::Deny,
    }
}
