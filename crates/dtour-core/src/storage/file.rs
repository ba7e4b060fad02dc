//! JSON file storage
//!
//! All slots live in a single JSON object on disk. Every operation reads the
//! file afresh so several processes sharing the file see each other's writes;
//! writes go through a temp file and a rename.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::Storage;
use crate::error::{Error, Result};

type Slots = BTreeMap<String, String>;

/// Slot storage backed by a JSON file
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStorage {
    /// Create a storage at the given path; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_slots(&self) -> Result<Slots> {
        if !self.path.exists() {
            return Ok(Slots::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Slots::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            Error::StorageError(format!(
                "Corrupt storage file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Read slots for a write; a corrupt file is replaced instead of failing
    fn read_slots_for_write(&self) -> Result<Slots> {
        match self.read_slots() {
            Err(Error::StorageError(msg)) => {
                warn!(path = %self.path.display(), error = %msg, "Discarding corrupt storage file");
                Ok(Slots::new())
            }
            other => other,
        }
    }

    fn write_slots(&self, slots: &Slots) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(slots)
            .map_err(|e| Error::StorageError(format!("Failed to serialize slots: {}", e)))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), slots = slots.len(), "Storage file written");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| Error::StorageError("storage write lock poisoned".to_string()))
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_slots()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock()?;
        let mut slots = self.read_slots_for_write()?;
        slots.insert(key.to_string(), value.to_string());
        self.write_slots(&slots)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock()?;
        let mut slots = self.read_slots_for_write()?;
        if slots.remove(key).is_some() {
            self.write_slots(&slots)?;
        }
        Ok(())
    }
}
