//! Persisted credential store. This is the only place that touches durable
//! storage; the session, the auth service and the CLI receive a store through
//! `Arc<dyn CredentialStore>` instead of reaching for a file or global map.
//!
//! Values are plain strings under fixed keys. Token material passes through
//! here, so implementations must never log values, only keys.

use crate::errors::AppError;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};
use tracing::{debug, warn};

/// Key under which the token variant keeps its opaque token.
pub const KEY_AUTH_TOKEN: &str = "auth_token";
/// Keys under which the JWT variant keeps its token pair.
pub const KEY_ACCESS: &str = "access";
pub const KEY_REFRESH: &str = "refresh";
/// Pending return path recorded by the navigation guard.
pub const KEY_RETURN_URL: &str = "return_url";
/// Cached profile fields.
pub const KEY_USERNAME: &str = "username";
pub const KEY_FIRST_NAME: &str = "first_name";
pub const KEY_LAST_NAME: &str = "last_name";
pub const KEY_EMAIL: &str = "email";

/// Key/value persistence capability.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns `AppError::Storage` if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// # Errors
    /// Returns `AppError::Storage` if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), AppError>;

    /// Erases every key.
    /// # Errors
    /// Returns `AppError::Storage` if the store cannot be emptied.
    fn clear(&self) -> Result<(), AppError>;

    /// Writes several entries as one update. Stores that persist on every
    /// write override this to persist once.
    /// # Errors
    /// Returns `AppError::Storage` if any entry cannot be persisted.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), AppError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

fn poisoned() -> AppError {
    AppError::Storage("Poisoned lock".to_string())
}

/// In-memory store, used by tests and by embedders that keep the session for
/// the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let map = entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().map_or(true, |entries| entries.is_empty())
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.clear();
        Ok(())
    }
}

/// JSON-file store that survives process restarts, the CLI's equivalent of
/// browser local storage. The whole map is rewritten on each update through a
/// temporary file and a rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store; an
    /// unreadable or corrupt file is logged and treated as empty so startup
    /// degrades to "unauthenticated" instead of failing.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("ignoring corrupt session file {}: {err}", path.display());
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!("ignoring unreadable session file {}: {err}", path.display());
                BTreeMap::new()
            }
        };

        debug!("session file {} opened", path.display());

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), AppError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let mut next = entries.clone();
        apply(&mut next);
        persist(&self.path, &next)?;
        *entries = next;
        Ok(())
    }
}

fn persist(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), AppError> {
    let storage_error = |err: std::io::Error| {
        AppError::Storage(format!("Failed to write {}: {err}", path.display()))
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(storage_error)?;
    }

    let contents = serde_json::to_string_pretty(entries)
        .map_err(|err| AppError::Serialization(format!("Failed to encode session: {err}")))?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).map_err(storage_error)?;
    restrict_permissions(&tmp).map_err(storage_error)?;
    fs::rename(&tmp, path).map_err(storage_error)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), AppError> {
        self.update(BTreeMap::clear)
    }

    fn set_all(&self, new_entries: &[(&str, &str)]) -> Result<(), AppError> {
        self.update(|entries| {
            for (key, value) in new_entries {
                entries.insert((*key).to_string(), (*value).to_string());
            }
        })
    }
}
