use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};

use super::{TourController, ViewState};
use crate::client::{ExecutionBackend, HttpBackend};
use crate::config::Config;
use crate::error::Result;
use crate::events::EventBus;
use crate::host::{Clipboard, MemoryClipboard, Navigator, RecordingNavigator};
use crate::progress::ProgressIndicator;
use crate::session::SessionStore;
use crate::storage::{MemoryStorage, Storage};

/// Builder for creating a TourController
///
/// Unset collaborators default to an HTTP backend for the configured
/// service, in-memory storage, a recording navigator at the configured
/// origin and an in-memory clipboard.
#[derive(Default)]
pub struct TourControllerBuilder {
    config: Option<Config>,
    storage: Option<Arc<dyn Storage>>,
    backend: Option<Arc<dyn ExecutionBackend>>,
    navigator: Option<Arc<dyn Navigator>>,
    clipboard: Option<Arc<dyn Clipboard>>,
    events: Option<EventBus>,
}

impl TourControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn ExecutionBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    /// Share an existing event bus instead of creating one
    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> Result<TourController> {
        let config = self.config.unwrap_or_default();
        let events = self.events.unwrap_or_default();

        let backend: Arc<dyn ExecutionBackend> = match self.backend {
            Some(backend) => backend,
            None => Arc::new(HttpBackend::new(&config.service)?),
        };
        let storage: Arc<dyn Storage> = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()) as Arc<dyn Storage>);
        let navigator: Arc<dyn Navigator> = self
            .navigator
            .unwrap_or_else(|| {
                Arc::new(RecordingNavigator::new(config.service.app_origin.clone())) as Arc<dyn Navigator>
            });
        let clipboard: Arc<dyn Clipboard> = self
            .clipboard
            .unwrap_or_else(|| Arc::new(MemoryClipboard::new()) as Arc<dyn Clipboard>);

        let store = SessionStore::new(storage, events.clone(), config.session.default_compiler.clone());
        let progress = ProgressIndicator::new(&config.progress, events.clone());

        Ok(TourController {
            config,
            store: Mutex::new(store),
            view: Mutex::new(ViewState::default()),
            context: Mutex::new(None),
            generation: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            progress,
            events,
            backend,
            navigator,
            clipboard,
        })
    }
}
