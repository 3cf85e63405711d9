//! Persisted Key-Value Storage
//!
//! Origin-scoped storage shared by every tab of the site, plus the change feed
//! that carries writes from one tab to the others.
//!
//! ```text
//! TabStorage(A) ──set──► StorageArea ──► backend
//!                              │
//!                              └──► broadcast ──► TabStorage(B) listeners
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::error::{StorageError, StorageResult};

/// Capacity of the cross-tab change feed
const CHANGE_FEED_CAPACITY: usize = 64;

/// Raw storage medium
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// In-memory backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let items = self
            .items
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        items.remove(key);
        Ok(())
    }
}

/// Backend persisting a flat JSON object to a single file
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so a crash never leaves a half-written store behind.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileBackend {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StorageResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> StorageResult<()> {
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(items)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> StorageResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let mut items = self.read_all()?;
        f(&mut items);
        self.write_all(&items)
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.modify(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.modify(|items| {
            items.remove(key);
        })
    }
}

/// Identifies one browsing context sharing a storage area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(Uuid);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Origin of changes that come from outside this process
    pub fn external() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One write observed on the shared storage
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    /// `None` when the key was removed
    pub new_value: Option<String>,
    /// Tab that performed the write
    pub origin: TabId,
}

/// Storage shared by every tab of one origin
pub struct StorageArea {
    backend: Arc<dyn StorageBackend>,
    changes: broadcast::Sender<StorageChange>,
}

impl StorageArea {
    pub fn new(backend: impl StorageBackend + 'static) -> Arc<Self> {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Arc::new(Self {
            backend: Arc::new(backend),
            changes,
        })
    }

    pub fn in_memory() -> Arc<Self> {
        Self::new(MemoryBackend::new())
    }

    /// Open a handle for a new browsing context
    pub fn open_tab(self: &Arc<Self>) -> TabStorage {
        TabStorage {
            area: Arc::clone(self),
            tab: TabId::new(),
        }
    }

    /// Feed a change that happened outside this process (e.g. a browser
    /// `storage` event) to every tab. The backend is not touched; the write
    /// has already happened.
    pub fn inject_external(&self, key: &str, new_value: Option<String>) {
        self.publish(StorageChange {
            key: key.to_string(),
            new_value,
            origin: TabId::external(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }

    fn publish(&self, change: StorageChange) {
        // No receivers simply means no other tab is listening
        let _ = self.changes.send(change);
    }
}

/// Storage as seen from one tab
#[derive(Clone)]
pub struct TabStorage {
    area: Arc<StorageArea>,
    tab: TabId,
}

impl TabStorage {
    pub fn tab_id(&self) -> TabId {
        self.tab
    }

    pub fn area(&self) -> &Arc<StorageArea> {
        &self.area
    }

    pub fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.area.backend.get_item(key)
    }

    pub fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.area.backend.set_item(key, value)?;
        self.area.publish(StorageChange {
            key: key.to_string(),
            new_value: Some(value.to_string()),
            origin: self.tab,
        });
        Ok(())
    }

    pub fn remove(&self, key: &str) -> StorageResult<()> {
        self.area.backend.remove_item(key)?;
        self.area.publish(StorageChange {
            key: key.to_string(),
            new_value: None,
            origin: self.tab,
        });
        Ok(())
    }

    pub fn changes(&self) -> broadcast::Receiver<StorageChange> {
        self.area.subscribe()
    }
}
