//! Host collaborators: page navigation and clipboard
//!
//! The controller never touches a browser or terminal directly. Hosts
//! provide these traits; the recording implementations keep everything in
//! memory for tests and headless use.

use std::fmt;
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Navigation in the host environment
pub trait Navigator: Send + Sync + fmt::Debug {
    /// Replace the current page
    fn navigate(&self, url: &str) -> Result<()>;

    /// Open a page in a new browsing context
    fn open_in_new_context(&self, url: &str) -> Result<()>;

    /// Origin of the current page, e.g. `https://tour.dlang.org`
    fn origin(&self) -> String;
}

/// Clipboard in the host environment
pub trait Clipboard: Send + Sync + fmt::Debug {
    fn copy(&self, text: &str) -> Result<()>;
}

/// Where a navigation went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    Navigate(String),
    NewContext(String),
}

impl Visit {
    pub fn url(&self) -> &str {
        match self {
            Self::Navigate(url) | Self::NewContext(url) => url,
        }
    }
}

/// Navigator that records visits instead of performing them
#[derive(Debug)]
pub struct RecordingNavigator {
    origin: String,
    visits: Mutex<Vec<Visit>>,
}

impl RecordingNavigator {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            visits: Mutex::new(Vec::new()),
        }
    }

    /// All visits so far, oldest first
    pub fn visits(&self) -> Vec<Visit> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Visit> {
        self.visits().pop()
    }

    fn record(&self, visit: Visit) -> Result<()> {
        self.visits
            .lock()
            .map_err(|e| Error::NavigationError(format!("Lock error: {}", e)))?
            .push(visit);
        Ok(())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) -> Result<()> {
        self.record(Visit::Navigate(url.to_string()))
    }

    fn open_in_new_context(&self, url: &str) -> Result<()> {
        self.record(Visit::NewContext(url.to_string()))
    }

    fn origin(&self) -> String {
        self.origin.clone()
    }
}

/// Clipboard holding its content in memory
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    content: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> Option<String> {
        self.content.lock().ok().and_then(|c| c.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let mut content = self
            .content
            .lock()
            .map_err(|e| Error::ClipboardError(format!("Lock error: {}", e)))?;
        *content = Some(text.to_string());
        Ok(())
    }
}
