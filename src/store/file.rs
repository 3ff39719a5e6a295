use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::secret_store::SecretStore;
use crate::error::StoreError;

/// On-disk representation of one secret
#[derive(Debug, Serialize, Deserialize)]
struct StoredSecret {
    secret_id: String,
    version_id: String,
    secret_string: String,
}

/// Local directory-backed store for development and dry runs.
///
/// Each secret lives in its own JSON document; writes replace it atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create store directory {:?}", directory))?;
        Ok(Self { directory })
    }

    /// Map a secret id to its file.
    ///
    /// Letters, digits, `-` and `.` are kept; every other byte, `_` included,
    /// becomes `_XX` so that distinct ids never share a file.
    fn path_for(&self, secret_id: &str) -> PathBuf {
        let mut file_name = String::with_capacity(secret_id.len());
        for byte in secret_id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'.' {
                file_name.push(char::from(byte));
            } else {
                file_name.push_str(&format!("_{:02X}", byte));
            }
        }
        self.directory.join(format!("{}.json", file_name))
    }

    async fn read_entry(&self, secret_id: &str) -> Result<StoredSecret, StoreError> {
        let path = self.path_for(secret_id);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| io_error(secret_id, e))?;

        let entry: StoredSecret = serde_json::from_str(&contents).map_err(|e| {
            StoreError::Service(format!("corrupt store entry {:?}: {}", path, e))
        })?;

        if entry.secret_id != secret_id {
            return Err(StoreError::NotFound(secret_id.to_string()));
        }
        Ok(entry)
    }
}

#[async_trait::async_trait]
impl SecretStore for FileStore {
    async fn get_secret_value(&self, secret_id: &str) -> Result<String, StoreError> {
        debug!("Reading secret from file store: {}", secret_id);
        Ok(self.read_entry(secret_id).await?.secret_string)
    }

    async fn put_secret_value(&self, secret_id: &str, body: &str) -> Result<String, StoreError> {
        debug!("Writing secret to file store: {}", secret_id);

        let entry = StoredSecret {
            secret_id: secret_id.to_string(),
            version_id: uuid::Uuid::new_v4().to_string(),
            secret_string: body.to_string(),
        };
        let contents = serde_json::to_string_pretty(&entry)
            .map_err(|e| StoreError::Service(format!("failed to encode store entry: {}", e)))?;

        let path = self.path_for(secret_id);
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, contents)
            .await
            .map_err(|e| io_error(secret_id, e))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| io_error(secret_id, e))?;

        info!(
            "Stored new version {} of secret '{}' in {:?}",
            entry.version_id, secret_id, self.directory
        );
        Ok(entry.version_id)
    }

    fn store_type(&self) -> &'static str {
        "Local file store"
    }
}

fn io_error(secret_id: &str, err: std::io::Error) -> StoreError {
    match err.kind() {
        ErrorKind::NotFound => StoreError::NotFound(secret_id.to_string()),
        ErrorKind::PermissionDenied => StoreError::AccessDenied(secret_id.to_string()),
        ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock => {
            StoreError::Transient(err.to_string())
        }
        _ => StoreError::Service(err.to_string()),
    }
}
