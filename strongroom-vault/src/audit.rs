//! Audit collaborator: fire-and-forget event records.
//!
//! The vault calls the sink synchronously but treats its failure as
//! non-fatal — logging never blocks or aborts a legitimate operation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::RwLock;

use crate::model::{FileId, PrincipalId};

/// Action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Upload,
    Download,
    Share,
    AccessDenied,
    IntegrityCheckFailed,
    KeyUnwrapFailed,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::Upload => write!(f, "upload"),
            AuditAction::Download => write!(f, "download"),
            AuditAction::Share => write!(f, "share"),
            AuditAction::AccessDenied => write!(f, "access_denied"),
            AuditAction::IntegrityCheckFailed => write!(f, "integrity_check_failed"),
            AuditAction::KeyUnwrapFailed => write!(f, "key_unwrap_failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
}

/// A single audit record.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub principal: PrincipalId,
    pub action: AuditAction,
    pub file: Option<FileId>,
    pub outcome: AuditOutcome,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        principal: PrincipalId,
        action: AuditAction,
        file: Option<FileId>,
        outcome: AuditOutcome,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            principal,
            action,
            file,
            outcome,
            detail: detail.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("audit sink failure: {0}")]
pub struct AuditError(pub String);

/// Accepts audit records. Implementations must not block the caller.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}

/// In-memory audit log for embedding and tests.
#[derive(Default)]
pub struct MemoryAuditLog {
    entries: RwLock<Vec<AuditEvent>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events, oldest first.
    pub fn entries(&self) -> Vec<AuditEvent> {
        self.entries
            .read()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Events matching `action`, oldest first.
    pub fn entries_for(&self, action: AuditAction) -> Vec<AuditEvent> {
        self.entries()
            .into_iter()
            .filter(|e| e.action == action)
            .collect()
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| AuditError(e.to_string()))?;
        entries.push(event);
        Ok(())
    }
}
