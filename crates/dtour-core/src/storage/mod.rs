//! Persistence adapter - named string slots surviving reloads
//!
//! The session store talks to local key-value storage only through the
//! [`Storage`] trait, mirroring browser-local storage: string keys mapped to
//! string values, with no structure beyond that.
//!
//! - `memory`: process-local map for tests and ephemeral hosts
//! - `file`: JSON file on disk used by the CLI

pub mod file;
pub mod memory;

use std::fmt;

use crate::error::Result;

pub use file::JsonFileStorage;
pub use memory::MemoryStorage;

/// Key-value storage medium for persisted snippet slots
pub trait Storage: Send + Sync + fmt::Debug {
    /// Read a slot; `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a slot, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
