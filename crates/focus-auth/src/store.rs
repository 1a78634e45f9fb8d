//! Credential persistence.
//!
//! The bearer token is the only state the client keeps across restarts.
//! [`FileCredentialStore`] writes it as JSON with 0o600 permissions; a file
//! that is unreadable, corrupt, or past its expiry is treated as absent.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use focus_core::User;

use crate::errors::AuthError;

/// On-disk form of a credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredential {
    /// Bearer token.
    pub token: String,
    /// Last known profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl StoredCredential {
    /// Whether the credential is past its expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Persistence backend for the session credential.
pub trait CredentialStore: Send + Sync {
    /// Load the stored credential, if any.
    fn load(&self) -> Option<StoredCredential>;
    /// Replace the stored credential.
    fn save(&self, credential: &StoredCredential) -> Result<(), AuthError>;
    /// Remove the stored credential. Removing nothing is not an error.
    fn clear(&self) -> Result<(), AuthError>;
}

/// JSON file store.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store at `path`. Parent directories are created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<StoredCredential> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), "failed to read credential file: {e}");
                return None;
            }
        };

        match serde_json::from_str::<StoredCredential>(&data) {
            Ok(cred) if cred.is_expired(Utc::now()) => {
                debug!(expires_at = %cred.expires_at, "stored credential expired, ignoring");
                None
            }
            Ok(cred) => Some(cred),
            Err(e) => {
                warn!(path = %self.path.display(), "failed to parse credential file: {e}");
                None
            }
        }
    }

    fn save(&self, credential: &StoredCredential) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(credential)?;
        std::fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store, for tests and for sessions that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<StoredCredential>>,
}

impl MemoryCredentialStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `credential`.
    pub fn with(credential: StoredCredential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<StoredCredential> {
        self.slot
            .lock()
            .clone()
            .filter(|c| !c.is_expired(Utc::now()))
    }

    fn save(&self, credential: &StoredCredential) -> Result<(), AuthError> {
        *self.slot.lock() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.slot.lock() = None;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
