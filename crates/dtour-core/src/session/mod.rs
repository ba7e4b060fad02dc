//! Session domain module
//!
//! Holds the editable snippet, its reset baseline, compiler selection and
//! extra arguments, and reconciles the three sources of truth for it:
//!
//! - the server-provided default for a tour page
//! - an edit persisted under the page's (or import's) key
//! - a snippet embedded in the navigation URL
//!
//! # Example
//!
//! ```ignore
//! use dtour_core::session::{NavigationContext, SessionStore};
//!
//! let mut store = SessionStore::new(storage, events, "dmd");
//! store.load_context(&NavigationContext::new("en", "basics", "imports"), default_source);
//! store.edit("void main() {}");
//! store.reset();
//! ```

#[allow(clippy::module_inception)]
pub mod session;
pub mod store;

pub use session::{
    DEFAULT_COMPILER, ImportParams, NavigationContext, Session, args_slot, compiler_slot,
    context_key, default_import_key, import_hash, import_key,
};
pub use store::{SessionSnapshot, SessionStore};
