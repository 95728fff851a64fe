//! Persistence of the anonymous identifier
//!
//! Only the server-issued id survives restarts. Counters are always
//! refetched from the server.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name used inside the state directory
pub const IDENTITY_FILE_NAME: &str = "anon_identity.json";

/// Where the anonymous identifier is kept between runs
pub trait IdentityStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, id: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredIdentity {
    uuid: String,
}

// ============================================================================
// File store
// ============================================================================

/// JSON file in the state directory
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(IDENTITY_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<StoredIdentity>(&content) {
            Ok(stored) if !stored.uuid.trim().is_empty() => Ok(Some(stored.uuid)),
            Ok(_) => Ok(None),
            Err(e) => {
                // A corrupt file is treated as no identity; the server mints a new one
                log::warn!(
                    "[identity] Ignoring unreadable identity file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&StoredIdentity {
            uuid: id.to_string(),
        })?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Memory store
// ============================================================================

/// Process-local store, for tests and one-shot runs
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    id: Mutex<Option<String>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Mutex::new(Some(id.into())),
        }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Result<Option<String>> {
        let guard = self
            .id
            .lock()
            .map_err(|_| Error::config("identity store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, id: &str) -> Result<()> {
        let mut guard = self
            .id
            .lock()
            .map_err(|_| Error::config("identity store lock poisoned"))?;
        *guard = Some(id.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .id
            .lock()
            .map_err(|_| Error::config("identity store lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}
