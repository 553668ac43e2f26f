//! Vault configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a `DocumentVault` instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Root directory for the content blob store.
    pub storage_root: PathBuf,

    /// Maximum accepted upload size in bytes.
    pub max_file_size: u64,

    /// Accepted content-type labels. Empty list means accept everything.
    pub allowed_content_types: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("strongroom-blobs"),
            max_file_size: 10 * 1024 * 1024, // 10 MiB
            allowed_content_types: vec![
                "text/plain".to_string(),
                "application/pdf".to_string(),
                "application/msword".to_string(),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                    .to_string(),
            ],
        }
    }
}

impl VaultConfig {
    /// Config rooted at `storage_root` that accepts any content type.
    pub fn permissive(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            allowed_content_types: Vec::new(),
            ..Self::default()
        }
    }
}
