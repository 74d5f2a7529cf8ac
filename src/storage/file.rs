//! JSON-file store used by the command-line front end. All keys live in a
//! single document so the token and the user record are replaced together on
//! disk. The file is written through a temporary sibling and renamed into
//! place, and on unix it is restricted to the owner because it holds a bearer
//! token.

use super::{KeyValueStore, StorageError};
use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};

const STATE_FILE: &str = "session.json";

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Creates a store backed by `<dir>/session.json`. The directory is created
    /// lazily on the first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STATE_FILE),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Reads the document for modification. A corrupted document is replaced
    /// rather than blocking writes and deletes; the flag reports whether that
    /// happened so the caller rewrites the file.
    async fn read_for_update(&self) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.read_document().await {
            Ok(document) => Ok((document, false)),
            Err(StorageError::Encoding(err)) => {
                warn!("Discarding unreadable state file {}: {}", self.path.display(), err);
                Ok((BTreeMap::new(), true))
            }
            Err(err) => Err(err),
        }
    }

    async fn write_document(&self, document: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let payload = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }

        fs::rename(&tmp, &self.path).await?;
        debug!("state file updated: {}", self.path.display());

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let document = self.read_document().await?;
        Ok(document.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let (mut document, _) = self.read_for_update().await?;
        document.insert(key.to_string(), value.to_string());
        self.write_document(&document).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let (mut document, corrupted) = self.read_for_update().await?;
        if document.remove(key).is_none() && !corrupted {
            return Ok(());
        }
        self.write_document(&document).await
    }
}
