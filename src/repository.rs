//! Persistence transport for the tracker collections.
//!
//! Each collection lives in its own string-keyed slot holding a JSON array.
//! The store only needs `get` and `set`, so any blob store can back it:
//! [`SledStore`] keeps slots in an embedded sled database on disk and
//! [`MemoryStore`] keeps them in a map.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, TrackerError};

/// Key prefix used when none is configured
pub const DEFAULT_KEY_PREFIX: &str = "jobTracker";

/// The four persisted slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// `jobs` slot
    Jobs,
    /// `contacts` slot
    Contacts,
    /// `companies` slot
    Companies,
    /// `tasks` slot
    Tasks,
}

impl Collection {
    /// Collection name as used in keys and export documents
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jobs => "jobs",
            Self::Contacts => "contacts",
            Self::Companies => "companies",
            Self::Tasks => "tasks",
        }
    }

    /// Storage key, e.g. `jobTracker-jobs`
    #[must_use]
    pub fn key(self, prefix: &str) -> String {
        format!("{prefix}-{}", self.name())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A string-keyed blob store
pub trait KeyValueStore {
    /// Read a slot; `None` when the key has never been written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a slot
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory slots
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots written so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no slot has been written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Slots kept in an embedded sled database
pub struct SledStore {
    db: sled::Db,
    flush_on_write: bool,
}

impl SledStore {
    /// Open or create the database directory at `path`
    pub fn open(path: &Path, flush_on_write: bool) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        debug!(path = %path.display(), "Opened sled store");
        Ok(Self { db, flush_on_write })
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| TrackerError::Storage(format!("Slot {key} is not UTF-8: {e}"))),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        if self.flush_on_write {
            self.db.flush()?;
        }
        Ok(())
    }
}
