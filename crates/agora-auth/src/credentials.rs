//! Persisted access-token slot
//!
//! Holds at most one bearer token at a time, persisted as a small JSON file.
//! All writes use atomic temp-file + rename to prevent corruption on crash.
//! A tokio Mutex serializes writes from login, logout, and refresh.
//!
//! There is no background expiry timer: `get()` checks the stored expiry
//! lazily and reports a lapsed token as absent. The server's 401 remains the
//! authoritative signal for a token that died early.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// The active session credential.
///
/// `expires` is a unix timestamp in milliseconds (absolute, not a delta).
/// Computed at storage time from the configured lifetime plus the current
/// time — the token itself is opaque and never decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Current access token (Bearer token for API calls)
    pub access: String,
    /// Expiration as unix timestamp in milliseconds
    pub expires: u64,
}

/// Thread-safe single-slot credential file manager.
///
/// The Mutex serializes all access. Reads clone the slot contents, so the
/// lock is never held across a network call.
pub struct CredentialStore {
    path: PathBuf,
    state: Mutex<Option<Credential>>,
}

impl CredentialStore {
    /// Load the credential slot from the given file path.
    ///
    /// If the file doesn't exist, creates it holding an empty slot (cold
    /// start, logged out). A file that fails to parse is treated the same
    /// way rather than erroring: a corrupt slot is indistinguishable from
    /// a missing token as far as callers are concerned.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading credential file: {e}")))?;
            match serde_json::from_str::<Option<Credential>>(&contents) {
                Ok(slot) => {
                    info!(path = %path.display(), present = slot.is_some(), "loaded credential slot");
                    slot
                }
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "credential file unreadable, treating as empty");
                    None
                }
            }
        } else {
            info!(path = %path.display(), "credential file not found, starting logged out");
            write_atomic(&path, &None).await?;
            None
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Read the current credential, if one is present and not lapsed.
    ///
    /// Never errors. A token whose expiry has passed is reported as absent;
    /// the stale value is left in place and simply ignored until the next
    /// `set` or `clear` overwrites it.
    pub async fn get(&self) -> Option<Credential> {
        let state = self.state.lock().await;
        match state.as_ref() {
            Some(c) if c.expires > now_millis() => Some(c.clone()),
            Some(_) => {
                debug!("stored credential has lapsed, reporting absent");
                None
            }
            None => None,
        }
    }

    /// Store a new access token, overwriting any prior value.
    ///
    /// `lifetime` is the client-side expiry hint; the absolute expiration
    /// is computed here from the current time.
    pub async fn set(&self, access: String, lifetime: Duration) -> Result<()> {
        let mut state = self.state.lock().await;
        let expires = now_millis() + lifetime.as_millis() as u64;
        *state = Some(Credential { access, expires });
        debug!(expires, "stored credential");
        write_atomic(&self.path, &state).await
    }

    /// Remove the stored credential unconditionally. Idempotent.
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.take().is_some() {
            debug!("cleared credential");
        }
        write_atomic(&self.path, &state).await
    }
}

/// Current time as unix milliseconds.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Write the credential slot to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. Sets file permissions to 0600 (owner read/write only) since
/// the file contains a bearer token.
async fn write_atomic(path: &Path, slot: &Option<Credential>) -> Result<()> {
    let json = serde_json::to_string_pretty(slot)
        .map_err(|e| Error::Parse(format!("serializing credential: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("credential path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".credential.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp credential file: {e}")))?;

    // Set 0600 permissions (unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting credential file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp credential file: {e}")))?;

    debug!(path = %path.display(), "persisted credential slot");
    Ok(())
}
