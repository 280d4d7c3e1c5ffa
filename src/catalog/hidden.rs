//! The user's dismissed ids, persisted as one JSON array under a single key.

use anyhow::{anyhow, Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

pub const HIDDEN_STORE_KEY: &str = "anime-finder-hidden";

/// Storage backend for the hidden-set. `load` returns `None` when nothing has
/// been persisted yet.
pub trait HiddenStore: Send {
    fn load(&self) -> Result<Option<String>>;
    fn save(&mut self, payload: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// One file per store key, under the platform data directory by default.
#[derive(Debug, Clone)]
pub struct FileHiddenStore {
    path: PathBuf,
}

impl FileHiddenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("anime-finder")
            .join(format!("{HIDDEN_STORE_KEY}.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HiddenStore for FileHiddenStore {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read hidden store {}", self.path.display())),
        }
    }

    fn save(&mut self, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

/// In-process store. Clones share the same slot, so a clone behaves like the
/// same storage seen after a reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryHiddenStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryHiddenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|s| s.clone())
    }
}

impl HiddenStore for MemoryHiddenStore {
    fn load(&self) -> Result<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| anyhow!("hidden store lock poisoned"))?;
        Ok(slot.clone())
    }

    fn save(&mut self, payload: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow!("hidden store lock poisoned"))?;
        *slot = Some(payload.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow!("hidden store lock poisoned"))?;
        *slot = None;
        Ok(())
    }
}

/// Hidden ids plus the store they persist to. Every mutation is written through
/// before it is applied in memory, so a failed write leaves the set unchanged.
pub struct HiddenSet {
    ids: BTreeSet<i32>,
    store: Box<dyn HiddenStore>,
}

impl HiddenSet {
    pub fn load(store: Box<dyn HiddenStore>) -> Result<Self> {
        let ids = match store.load()? {
            Some(raw) => serde_json::from_str::<Vec<i32>>(&raw)
                .context("Failed to parse hidden anime list")?
                .into_iter()
                .collect(),
            None => BTreeSet::new(),
        };
        debug!("Loaded {} hidden anime", ids.len());
        Ok(Self { ids, store })
    }

    pub fn contains(&self, id: i32) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns false when the id was already hidden.
    pub fn hide(&mut self, id: i32) -> Result<bool> {
        if self.ids.contains(&id) {
            return Ok(false);
        }
        let mut next = self.ids.clone();
        next.insert(id);
        self.persist(next)?;
        Ok(true)
    }

    /// Returns false when the id was not hidden.
    pub fn restore(&mut self, id: i32) -> Result<bool> {
        if !self.ids.contains(&id) {
            return Ok(false);
        }
        let mut next = self.ids.clone();
        next.remove(&id);
        self.persist(next)?;
        Ok(true)
    }

    /// Forgets every hidden id and erases the persisted entry.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()?;
        self.ids.clear();
        Ok(())
    }

    fn persist(&mut self, next: BTreeSet<i32>) -> Result<()> {
        if next.is_empty() {
            self.store.clear()?;
        } else {
            let payload = serde_json::to_string(&next.iter().collect::<Vec<_>>())
                .context("Failed to serialize hidden anime list")?;
            self.store.save(&payload)?;
        }
        self.ids = next;
        Ok(())
    }
}
