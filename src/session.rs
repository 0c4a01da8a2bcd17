use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{error::ClientResult, models::UserRecord};

/// Key under which the opaque bearer token is persisted.
pub const TOKEN_KEY: &str = "token";
/// Key under which the JSON-serialized `UserRecord` is persisted.
pub const USER_KEY: &str = "user";

// 1. KeyValueStore Contract
/// KeyValueStore
///
/// The durable key-value store the session lives in. Multi-key writes and removals
/// are single calls so an implementation can make them all-or-nothing.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set_many(&self, entries: &[(&str, String)]) -> io::Result<()>;
    fn remove_many(&self, keys: &[&str]) -> io::Result<()>;
}

// 2. The File-Backed Implementation
/// FileStore
///
/// Persists all keys as one JSON object in a single file. Every mutation rewrites
/// the file through a sibling temp file and a rename, so a reader either sees the
/// old content or the new one.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file is an empty store.
    fn read_entries(&self) -> BTreeMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return BTreeMap::new(),
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Discarding corrupt session file");
            BTreeMap::new()
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_vec_pretty(entries).map_err(io::Error::other)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serialized)?;
        fs::rename(&tmp, &self.path)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_entries().remove(key)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> io::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut current = self.read_entries();
        for (key, value) in entries {
            current.insert((*key).to_string(), value.clone());
        }
        self.write_entries(&current)
    }

    fn remove_many(&self, keys: &[&str]) -> io::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut current = self.read_entries();
        for key in keys {
            current.remove(*key);
        }
        self.write_entries(&current)
    }
}

// 3. The In-Memory Implementation (Tests, Ephemeral Sessions)
/// MemoryStore
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds raw values, e.g. to simulate a corrupt record.
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let map = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: RwLock::new(map),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_many(&self, entries: &[(&str, String)]) -> io::Result<()> {
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> io::Result<()> {
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// Session
///
/// The client's view of who is logged in. Valid states hold both fields or neither.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<UserRecord>,
    pub token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.token.is_none()
    }
}

/// SessionStore
///
/// Process-wide owner of the persisted session. Reads are served from an in-memory
/// copy; writes update that copy and then the backing store.
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
    cached: RwLock<Session>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        let store = Self {
            backend,
            cached: RwLock::new(Session::default()),
        };
        store.load();
        store
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.cached.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.cached.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// load
    ///
    /// Re-reads the persisted session. Token and user are only ever returned
    /// together: if either is missing or the user record does not parse, both keys
    /// are dropped and the session is empty. This never fails.
    pub fn load(&self) -> Session {
        let token = self.backend.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let user = self.backend.get(USER_KEY).and_then(|raw| {
            serde_json::from_str::<UserRecord>(&raw)
                .map_err(|e| tracing::warn!(error = %e, "Ignoring corrupt stored user record"))
                .ok()
        });
        let session = match (token, user) {
            (Some(token), Some(user)) => Session {
                user: Some(user),
                token: Some(token),
            },
            (None, None) => Session::default(),
            (token, _) => {
                tracing::warn!(
                    has_token = token.is_some(),
                    "Discarding half-persisted session"
                );
                if let Err(e) = self.backend.remove_many(&[TOKEN_KEY, USER_KEY]) {
                    tracing::warn!(error = %e, "Failed to remove stale session keys");
                }
                Session::default()
            }
        };
        *self.write() = session.clone();
        session
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    /// Overwrites the stored user record.
    pub fn save(&self, user: &UserRecord) -> ClientResult<()> {
        let serialized = serde_json::to_string(user)?;
        self.write().user = Some(user.clone());
        self.backend.set_many(&[(USER_KEY, serialized)])?;
        Ok(())
    }

    pub fn set_token(&self, token: &str) -> ClientResult<()> {
        self.write().token = Some(token.to_string());
        self.backend.set_many(&[(TOKEN_KEY, token.to_string())])?;
        Ok(())
    }

    pub fn get_token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn clear_token(&self) -> ClientResult<()> {
        self.write().token = None;
        self.backend.remove_many(&[TOKEN_KEY])?;
        Ok(())
    }

    /// establish
    ///
    /// Stores a fresh token and its user in one backend write.
    pub fn establish(&self, token: &str, user: &UserRecord) -> ClientResult<()> {
        let serialized = serde_json::to_string(user)?;
        *self.write() = Session {
            user: Some(user.clone()),
            token: Some(token.to_string()),
        };
        self.backend
            .set_many(&[(TOKEN_KEY, token.to_string()), (USER_KEY, serialized)])?;
        Ok(())
    }

    /// clear
    ///
    /// Empties the in-memory session unconditionally, then removes both keys in one
    /// backend call. A persistence failure is reported but never leaves a
    /// half-cleared session visible to readers.
    pub fn clear(&self) -> ClientResult<()> {
        *self.write() = Session::default();
        self.backend.remove_many(&[TOKEN_KEY, USER_KEY])?;
        Ok(())
    }

    pub fn current_user(&self) -> Option<UserRecord> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }
}
