//! Dtour Core Library
//!
//! Session controller for an interactive language tour:
//! - Session state with local persistence of edits
//! - Remote execution (run, disassembly, IR, AST, format, share)
//! - Safe rendering of compiler output and diagnostics
//! - Hotkeys, page navigation and share links

pub mod client;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod host;
pub mod hotkeys;
pub mod library;
pub mod progress;
pub mod render;
pub mod session;
pub mod share;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::{ExecutionBackend, HttpBackend};
    pub use crate::config::Config;
    pub use crate::controller::{ActionOutcome, TourController};
    pub use crate::error::{Error, Result};
    pub use crate::events::TourEvent;
    pub use crate::render::RenderedOutput;
    pub use crate::session::{ImportParams, NavigationContext};
}

#[cfg(test)]
mod controller_tests;
