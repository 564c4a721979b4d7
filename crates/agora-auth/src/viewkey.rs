//! Anonymous view-key storage
//!
//! The view-key is a long-lived opaque identifier used for anonymous
//! view-deduplication on board reads. It is generated once per installation,
//! persisted indefinitely, and deliberately independent of the session: it
//! survives logout, refresh failure, and credential expiry.

use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::info;

use crate::error::{Error, Result};

/// File-backed view-key slot.
pub struct ViewKeyStore {
    path: PathBuf,
    state: Mutex<Option<String>>,
}

impl ViewKeyStore {
    /// Load the view-key from the given file path, if one was generated before.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading view-key file: {e}")))?;
            let key = contents.trim().to_owned();
            if key.is_empty() { None } else { Some(key) }
        } else {
            None
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Return the stored view-key, generating and persisting one on first use.
    ///
    /// Every call after the first returns the same value.
    pub async fn get_or_create(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        if let Some(key) = state.as_ref() {
            return Ok(key.clone());
        }

        let key = uuid::Uuid::new_v4().to_string();
        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::Io("view-key path has no parent directory".into()))?;

        let tmp_path = dir.join(format!(".viewkey.tmp.{}", std::process::id()));
        tokio::fs::write(&tmp_path, key.as_bytes())
            .await
            .map_err(|e| Error::Io(format!("writing temp view-key file: {e}")))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| Error::Io(format!("renaming temp view-key file: {e}")))?;

        info!(path = %self.path.display(), "generated view-key");
        *state = Some(key.clone());
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generated_once_and_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewkey");

        let store = ViewKeyStore::load(path).await.unwrap();
        let first = store.get_or_create().await.unwrap();
        let second = store.get_or_create().await.unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[tokio::test]
    async fn survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewkey");

        let store = ViewKeyStore::load(path.clone()).await.unwrap();
        let first = store.get_or_create().await.unwrap();

        let store2 = ViewKeyStore::load(path).await.unwrap();
        let second = store2.get_or_create().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn blank_file_regenerates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewkey");
        tokio::fs::write(&path, "  \n").await.unwrap();

        let store = ViewKeyStore::load(path).await.unwrap();
        let key = store.get_or_create().await.unwrap();
        assert!(!key.trim().is_empty());
    }
}
