//! Change notifications for editor adapters and output views
//!
//! Every state change in the session store or the controller's view state is
//! announced as a [`TourEvent`]. Subscribers receive events through a tokio
//! broadcast channel; a subscriber that falls behind sees `Lagged` and should
//! re-read state from the controller.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of buffered events per subscriber
const DEFAULT_CAPACITY: usize = 64;

/// Session or view state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TourEvent {
    /// A new session replaced the previous one
    SessionLoaded { key: String },
    /// The editable source changed
    SourceChanged { source: String },
    /// Compiler or extra arguments changed
    SettingsChanged { compiler: String, args: String },
    /// Source and settings were restored to their baseline
    SessionReset,
    /// The output area was replaced
    OutputChanged,
    /// Diagnostics were replaced or cleared
    DiagnosticsChanged { count: usize, lint_enabled: bool },
    /// Progress indicator started, advanced or stopped
    ProgressChanged { value: u32, running: bool },
    /// Share link produced or cleared
    ShareLinkChanged { url: Option<String> },
    /// The host was asked to navigate
    Navigated { url: String },
}

/// Broadcast channel for [`TourEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TourEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to subsequent events
    pub fn subscribe(&self) -> broadcast::Receiver<TourEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; having no subscribers is fine
    pub fn emit(&self, event: TourEvent) {
        trace!(?event, "Emitting tour event");
        let _ = self.sender.send(event);
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
