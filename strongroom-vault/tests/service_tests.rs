use std::sync::Arc;

use pretty_assertions::assert_eq;
use strongroom_blobstore::BlobStore;
use strongroom_vault::{
    AuditAction, AuditError, AuditEvent, AuditSink, DocumentVault, MemoryAuditLog,
    MemoryDirectory, MemoryShareDirectory, Principal, SharePermission, VaultConfig, VaultError,
};
use tempfile::TempDir;

struct Harness {
    _dir: TempDir,
    vault: DocumentVault,
    directory: Arc<MemoryDirectory>,
    audit: Arc<MemoryAuditLog>,
    storage_root: std::path::PathBuf,
}

fn harness() -> Harness {
    harness_with(|root| VaultConfig::permissive(root))
}

fn harness_with(config: impl FnOnce(&std::path::Path) -> VaultConfig) -> Harness {
    let dir = TempDir::new().unwrap();
    let storage_root = dir.path().join("blobs");
    let config = config(&storage_root);

    let directory = Arc::new(MemoryDirectory::new());
    let shares = Arc::new(MemoryShareDirectory::new());
    let audit = Arc::new(MemoryAuditLog::new());
    let store = Arc::new(BlobStore::open(&storage_root).unwrap());

    let vault = DocumentVault::new(
        config,
        store,
        directory.clone(),
        shares,
        audit.clone(),
    );
    Harness {
        _dir: dir,
        vault,
        directory,
        audit,
        storage_root,
    }
}

fn register(h: &Harness, name: &str) -> Principal {
    h.directory.register(name).unwrap()
}

#[test]
fn owner_uploads_and_downloads() {
    let h = harness();
    let alice = register(&h, "alice");

    let file = h
        .vault
        .upload(alice.id, "notes.txt", "text/plain", b"hello vault")
        .unwrap();
    let downloaded = h.vault.download(alice.id, file.id).unwrap();

    assert_eq!(downloaded.content, b"hello vault");
    assert_eq!(downloaded.original_name, "notes.txt");
    assert_eq!(downloaded.content_type, "text/plain");

    let actions: Vec<AuditAction> = h.audit.entries().iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![AuditAction::Upload, AuditAction::Download]);
}

#[test]
fn plaintext_never_reaches_storage() {
    let h = harness();
    let alice = register(&h, "alice");
    let secret = b"extremely sensitive document body";

    let file = h
        .vault
        .upload(alice.id, "s.txt", "text/plain", secret)
        .unwrap();

    let blob = std::fs::read(h.storage_root.join(&file.location)).unwrap();
    assert!(!blob
        .windows(secret.len())
        .any(|w| w == secret.as_slice()));
}

#[test]
fn stranger_is_denied_and_audited() {
    let h = harness();
    let alice = register(&h, "alice");
    let mallory = register(&h, "mallory");

    let file = h
        .vault
        .upload(alice.id, "private.txt", "text/plain", b"owner eyes only")
        .unwrap();

    let result = h.vault.download(mallory.id, file.id);
    assert!(matches!(result, Err(VaultError::AccessDenied)));

    let denials = h.audit.entries_for(AuditAction::AccessDenied);
    assert_eq!(denials.len(), 1);
    assert_eq!(denials[0].principal, mallory.id);
    assert_eq!(denials[0].file, Some(file.id));
}

#[test]
fn unknown_file_gets_the_same_denial() {
    let h = harness();
    let alice = register(&h, "alice");
    let mallory = register(&h, "mallory");

    let file = h
        .vault
        .upload(alice.id, "real.txt", "text/plain", b"exists")
        .unwrap();

    let missing_grant = h.vault.download(mallory.id, file.id).unwrap_err();
    let missing_file = h
        .vault
        .download(mallory.id, strongroom_vault::FileId::new())
        .unwrap_err();

    // No existence oracle: identical error either way
    assert_eq!(missing_grant.to_string(), missing_file.to_string());
    assert!(matches!(missing_file, VaultError::AccessDenied));
}

#[test]
fn shared_file_opens_with_grantee_key() {
    let h = harness();
    let alice = register(&h, "alice");
    let bob = register(&h, "bob");

    let file = h
        .vault
        .upload(alice.id, "shared.txt", "text/plain", b"for bob too")
        .unwrap();
    let grant = h
        .vault
        .share(alice.id, file.id, bob.id, SharePermission::View)
        .unwrap();

    // Grantee-specific wrapped key, not a copy of the owner's
    assert_ne!(grant.wrapped_key.ciphertext, file.wrapped_key.ciphertext);

    let downloaded = h.vault.download(bob.id, file.id).unwrap();
    assert_eq!(downloaded.content, b"for bob too");

    // Owner still opens with their own key
    assert_eq!(h.vault.download(alice.id, file.id).unwrap().content, b"for bob too");
}

#[test]
fn permission_level_is_advisory_for_reads() {
    let h = harness();
    let alice = register(&h, "alice");
    let bob = register(&h, "bob");

    let file = h
        .vault
        .upload(alice.id, "doc.txt", "text/plain", b"content")
        .unwrap();
    h.vault
        .share(alice.id, file.id, bob.id, SharePermission::Edit)
        .unwrap();

    assert!(h.vault.download(bob.id, file.id).is_ok());
}

#[test]
fn only_the_owner_may_share() {
    let h = harness();
    let alice = register(&h, "alice");
    let bob = register(&h, "bob");
    let carol = register(&h, "carol");

    let file = h
        .vault
        .upload(alice.id, "doc.txt", "text/plain", b"content")
        .unwrap();
    h.vault
        .share(alice.id, file.id, bob.id, SharePermission::View)
        .unwrap();

    // Bob can read, but cannot re-share
    let result = h.vault.share(bob.id, file.id, carol.id, SharePermission::View);
    assert!(matches!(result, Err(VaultError::AccessDenied)));
}

#[test]
fn sharing_with_unknown_grantee_is_a_validation_error() {
    let h = harness();
    let alice = register(&h, "alice");

    let file = h
        .vault
        .upload(alice.id, "doc.txt", "text/plain", b"content")
        .unwrap();
    let ghost = strongroom_vault::PrincipalId::new();

    let result = h.vault.share(alice.id, file.id, ghost, SharePermission::View);
    assert!(matches!(result, Err(VaultError::Validation(_))));
}

#[test]
fn tampered_blob_fails_integrity_and_is_audited() {
    let h = harness();
    let alice = register(&h, "alice");

    let file = h
        .vault
        .upload(alice.id, "doc.txt", "text/plain", b"original content")
        .unwrap();

    // Flip one ciphertext byte on disk (past the nonce prefix)
    let path = h.storage_root.join(&file.location);
    let mut blob = std::fs::read(&path).unwrap();
    let last = blob.len() - 1;
    blob[last] ^= 0x01;
    std::fs::write(&path, &blob).unwrap();

    let result = h.vault.download(alice.id, file.id);
    assert!(matches!(result, Err(VaultError::IntegrityViolation)));

    let incidents = h.audit.entries_for(AuditAction::IntegrityCheckFailed);
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].file, Some(file.id));
}

#[test]
fn upload_validation_happens_at_the_boundary() {
    let h = harness_with(|root| VaultConfig {
        storage_root: root.to_path_buf(),
        max_file_size: 16,
        ..VaultConfig::default()
    });
    let alice = register(&h, "alice");

    let bad_type = h.vault.upload(alice.id, "x.exe", "application/x-dosexec", b"mz");
    assert!(matches!(bad_type, Err(VaultError::Validation(_))));

    let too_big = h
        .vault
        .upload(alice.id, "big.txt", "text/plain", &[0u8; 17]);
    assert!(matches!(too_big, Err(VaultError::Validation(_))));

    // Rejected uploads never touch the audit trail or storage
    assert!(h.audit.entries().is_empty());
    assert!(h.vault.list_owned(alice.id).is_empty());
}

#[test]
fn reupload_creates_a_new_sealed_file() {
    let h = harness();
    let alice = register(&h, "alice");

    let v1 = h
        .vault
        .upload(alice.id, "doc.txt", "text/plain", b"first version")
        .unwrap();
    let v2 = h
        .vault
        .upload(alice.id, "doc.txt", "text/plain", b"second version")
        .unwrap();

    assert_ne!(v1.id, v2.id);
    assert_ne!(v1.location, v2.location);
    assert_eq!(h.vault.download(alice.id, v1.id).unwrap().content, b"first version");
    assert_eq!(h.vault.download(alice.id, v2.id).unwrap().content, b"second version");
}

#[test]
fn listings_are_scoped_per_principal() {
    let h = harness();
    let alice = register(&h, "alice");
    let bob = register(&h, "bob");

    let a1 = h
        .vault
        .upload(alice.id, "alice-1.txt", "text/plain", b"a1")
        .unwrap();
    h.vault
        .upload(bob.id, "bob-1.txt", "text/plain", b"b1")
        .unwrap();
    h.vault
        .share(alice.id, a1.id, bob.id, SharePermission::View)
        .unwrap();

    let alice_owned = h.vault.list_owned(alice.id);
    assert_eq!(alice_owned.len(), 1);
    assert_eq!(alice_owned[0].original_name, "alice-1.txt");

    let bob_shared = h.vault.shared_with_me(bob.id).unwrap();
    assert_eq!(bob_shared.len(), 1);
    assert_eq!(bob_shared[0].id, a1.id);

    assert!(h.vault.shared_with_me(alice.id).unwrap().is_empty());
}

#[test]
fn search_spans_owned_and_shared_files() {
    let h = harness();
    let alice = register(&h, "alice");
    let bob = register(&h, "bob");

    let report = h
        .vault
        .upload(alice.id, "Quarterly Report.pdf", "application/pdf", b"q1")
        .unwrap();
    h.vault
        .upload(bob.id, "bob-report.txt", "text/plain", b"b")
        .unwrap();
    h.vault
        .share(alice.id, report.id, bob.id, SharePermission::View)
        .unwrap();

    let hits = h.vault.search(bob.id, "report").unwrap();
    assert_eq!(hits.len(), 2);

    assert!(h.vault.search(bob.id, "").unwrap().is_empty());
    assert!(h.vault.search(bob.id, "no-such-name").unwrap().is_empty());
}

#[test]
fn file_metadata_respects_access_decisions() {
    let h = harness();
    let alice = register(&h, "alice");
    let mallory = register(&h, "mallory");

    let file = h
        .vault
        .upload(alice.id, "meta.txt", "text/plain", b"m")
        .unwrap();

    let meta = h.vault.file_metadata(alice.id, file.id).unwrap();
    assert_eq!(meta.size, 1);

    assert!(matches!(
        h.vault.file_metadata(mallory.id, file.id),
        Err(VaultError::AccessDenied)
    ));
}

struct FailingAuditSink;

impl AuditSink for FailingAuditSink {
    fn record(&self, _event: AuditEvent) -> Result<(), AuditError> {
        Err(AuditError("sink unavailable".to_string()))
    }
}

#[test]
fn audit_sink_failure_never_aborts_an_operation() {
    let dir = TempDir::new().unwrap();
    let directory = Arc::new(MemoryDirectory::new());
    let vault = DocumentVault::new(
        VaultConfig::permissive(dir.path()),
        Arc::new(BlobStore::open(dir.path()).unwrap()),
        directory.clone(),
        Arc::new(MemoryShareDirectory::new()),
        Arc::new(FailingAuditSink),
    );
    let alice = directory.register("alice").unwrap();

    let file = vault
        .upload(alice.id, "doc.txt", "text/plain", b"still works")
        .unwrap();
    let downloaded = vault.download(alice.id, file.id).unwrap();
    assert_eq!(downloaded.content, b"still works");
}
