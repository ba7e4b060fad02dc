//! Session state store
//!
//! Owns the current [`Session`] and is the only writer of its persistence
//! slot. Every mutation persists the session and is announced on the event
//! bus.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::session::{
    NavigationContext, Session, args_slot, compiler_slot, default_import_key, import_key,
};
use super::ImportParams;
use crate::events::{EventBus, TourEvent};
use crate::storage::Storage;

/// Snapshot of what a request needs from the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub source: String,
    pub compiler: String,
    pub args: String,
}

/// Single source of truth for the editable snippet
#[derive(Debug)]
pub struct SessionStore {
    session: Session,
    storage: Arc<dyn Storage>,
    events: EventBus,
    default_compiler: String,
}

impl SessionStore {
    /// Create a store with an unloaded session
    pub fn new(storage: Arc<dyn Storage>, events: EventBus, default_compiler: impl Into<String>) -> Self {
        let default_compiler = default_compiler.into();
        Self {
            session: Session::unloaded(default_compiler.clone()),
            storage,
            events,
            default_compiler,
        }
    }

    /// Current session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Compiler restored by reset
    pub fn default_compiler(&self) -> &str {
        &self.default_compiler
    }

    /// Copy of the fields a request is built from
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            source: self.session.source().to_string(),
            compiler: self.session.compiler.clone(),
            args: self.session.args.clone(),
        }
    }

    // ========== Loading ==========

    /// Replace the session with the one for a tour page
    ///
    /// `default_source` is the server-provided snippet for the page. A
    /// persisted edit under the page's key takes precedence over it.
    pub fn load_context(&mut self, context: &NavigationContext, default_source: String) {
        let key = context.persistence_key();
        let source = self.read_slot(&key).unwrap_or_else(|| default_source.clone());
        let compiler = self
            .read_slot(&compiler_slot(&key))
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.default_compiler.clone());
        let args = self.read_slot(&args_slot(&key)).unwrap_or_default();

        info!(key = %key, restored = source != default_source, "Loaded tour page session");
        self.replace(Session {
            source_code: Some(source),
            reset_code: default_source,
            persistence_key: key,
            compiler,
            args,
        });
    }

    /// Replace the session with an imported snippet
    ///
    /// With a `source` URL parameter the text is the baseline and the key is
    /// derived from its hash; otherwise `decoded_default` is the baseline and
    /// the key is the host-wide default key. Compiler and arguments given in
    /// the URL win over persisted ones.
    pub fn load_import(&mut self, params: &ImportParams, decoded_default: Option<String>) {
        let (baseline, key) = match &params.source {
            Some(source) => (source.clone(), import_key(source)),
            None => (
                decoded_default.unwrap_or_default(),
                default_import_key(&params.host),
            ),
        };

        let source = self.read_slot(&key).unwrap_or_else(|| baseline.clone());
        let compiler = params
            .compiler
            .clone()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| self.read_slot(&compiler_slot(&key)).filter(|c| !c.trim().is_empty()))
            .unwrap_or_else(|| self.default_compiler.clone());
        let args = params
            .args
            .clone()
            .or_else(|| self.read_slot(&args_slot(&key)))
            .unwrap_or_default();

        info!(key = %key, compiler = %compiler, "Loaded imported session");
        self.replace(Session {
            source_code: Some(source),
            reset_code: baseline,
            persistence_key: key,
            compiler,
            args,
        });
    }

    /// Drop the current session without touching persisted slots
    pub fn unload(&mut self) {
        if !self.session.is_loaded() && self.session.persistence_key.is_empty() {
            return;
        }
        debug!(key = %self.session.persistence_key, "Session unloaded");
        self.session = Session::unloaded(self.default_compiler.clone());
        self.emit_settings();
    }

    fn replace(&mut self, session: Session) {
        self.session = session;
        self.events.emit(TourEvent::SessionLoaded {
            key: self.session.persistence_key.clone(),
        });
        self.events.emit(TourEvent::SourceChanged {
            source: self.session.source().to_string(),
        });
        self.emit_settings();
    }

    // ========== Mutations ==========

    /// Set the editable source and persist the session
    pub fn edit(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.session.source_code.as_deref() == Some(text.as_str()) {
            return;
        }
        self.session.source_code = Some(text);
        self.persist();
        self.events.emit(TourEvent::SourceChanged {
            source: self.session.source().to_string(),
        });
    }

    /// Replace the source with formatter output
    ///
    /// Only the source slot is written; compiler and arguments keep whatever
    /// was persisted for them.
    pub fn replace_source(&mut self, text: impl Into<String>) {
        self.session.source_code = Some(text.into());
        if !self.session.persistence_key.is_empty() {
            let key = self.session.persistence_key.clone();
            self.write_slot(&key, self.session.source());
        }
        self.events.emit(TourEvent::SourceChanged {
            source: self.session.source().to_string(),
        });
    }

    /// Select a compiler and persist the session
    pub fn set_compiler(&mut self, compiler: impl Into<String>) {
        let compiler = compiler.into();
        self.session.compiler = if compiler.trim().is_empty() {
            self.default_compiler.clone()
        } else {
            compiler.trim().to_string()
        };
        self.persist();
        self.emit_settings();
    }

    /// Set extra arguments and persist the session
    pub fn set_args(&mut self, args: impl Into<String>) {
        self.session.args = args.into();
        self.persist();
        self.emit_settings();
    }

    /// Restore the baseline source and default settings, then persist
    pub fn reset(&mut self) {
        if !self.session.is_loaded() {
            debug!("Reset ignored: no session loaded");
            return;
        }
        self.session.source_code = Some(self.session.reset_code.clone());
        self.session.compiler = self.default_compiler.clone();
        self.session.args.clear();
        self.persist();

        info!(key = %self.session.persistence_key, "Session reset to baseline");
        self.events.emit(TourEvent::SessionReset);
        self.events.emit(TourEvent::SourceChanged {
            source: self.session.source().to_string(),
        });
        self.emit_settings();
    }

    // ========== Persistence ==========

    /// Write source, compiler and arguments under the session key
    ///
    /// Failures are logged and otherwise ignored.
    pub fn persist(&self) {
        if self.session.persistence_key.is_empty() || !self.session.is_loaded() {
            return;
        }
        let key = &self.session.persistence_key;
        self.write_slot(key, self.session.source());
        self.write_slot(&compiler_slot(key), &self.session.compiler);
        self.write_slot(&args_slot(key), &self.session.args);
    }

    fn read_slot(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable persisted slot, using baseline");
                None
            }
        }
    }

    fn write_slot(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            warn!(key = %key, error = %e, "Failed to persist slot");
        }
    }

    fn emit_settings(&self) {
        self.events.emit(TourEvent::SettingsChanged {
            compiler: self.session.compiler.clone(),
            args: self.session.args.clone(),
        });
    }
}
