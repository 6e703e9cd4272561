//! Identity store: the active user's identifier, kept across restarts.
//!
//! Starts empty (or with whatever the durable file holds), is set by the
//! intake flow on the first successful profile submission and is cleared
//! only explicitly. Every write hits the durable file before the in-memory
//! value changes, so a reload restores the same session.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::UserId;
use crate::error::IdentityError;

#[derive(Serialize, Deserialize)]
struct IdentityRecord {
    user_id: UserId,
}

/// Process-wide holder of the single identity value.
pub struct IdentityStore {
    path: Option<PathBuf>,
    current: RwLock<Option<UserId>>,
}

impl IdentityStore {
    /// Open a file-backed store, restoring any previously saved identity.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, IdentityError> {
        let path = path.into();
        let current = load(&path)?;
        info!(path = %path.display(), restored = current.is_some(), "Identity store opened");
        Ok(Self {
            path: Some(path),
            current: RwLock::new(current),
        })
    }

    /// A store with no durable backing (for tests and one-off sessions).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: RwLock::new(None),
        }
    }

    pub fn get(&self) -> Option<UserId> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }

    /// Persist `id` and make it the active identity.
    pub fn set(&self, id: UserId) -> Result<(), IdentityError> {
        if let Some(path) = &self.path {
            save(path, &id)?;
        }
        debug!(user_id = %id, "Identity set");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(id);
        Ok(())
    }

    /// Remove the durable record and forget the identity.
    pub fn clear(&self) -> Result<(), IdentityError> {
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_error(path, e)),
            }
        }
        debug!("Identity cleared");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> IdentityError {
    IdentityError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn load(path: &Path) -> Result<Option<UserId>, IdentityError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(path, e)),
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let record: IdentityRecord = serde_json::from_str(&raw)?;
    Ok(Some(record.user_id))
}

/// Write via a sibling temp file, then rename over the record.
fn save(path: &Path, id: &UserId) -> Result<(), IdentityError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let json = serde_json::to_string(&IdentityRecord {
        user_id: id.clone(),
    })?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_error(path, e))?;
    Ok(())
}
