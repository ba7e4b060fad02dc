//! Progress indicator driven while a run-family request is in flight
//!
//! The value advances by `step` every `tick` and wraps at 100. Each
//! [`ProgressIndicator::start`] hands out a ticket; only the holder of the
//! latest ticket can stop the indicator, so a superseded request finishing
//! late does not hide the progress of its successor.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::ProgressConfig;
use crate::events::{EventBus, TourEvent};

#[derive(Debug)]
struct Shared {
    value: AtomicU32,
    ticket: AtomicU64,
    running: Mutex<Option<JoinHandle<()>>>,
}

/// Ticking progress value with ticket-guarded stop
#[derive(Debug)]
pub struct ProgressIndicator {
    shared: Arc<Shared>,
    events: EventBus,
    tick: Duration,
    step: u32,
}

impl ProgressIndicator {
    pub fn new(config: &ProgressConfig, events: EventBus) -> Self {
        Self {
            shared: Arc::new(Shared {
                value: AtomicU32::new(0),
                ticket: AtomicU64::new(0),
                running: Mutex::new(None),
            }),
            events,
            tick: Duration::from_millis(config.tick_ms.max(1)),
            step: config.step.max(1),
        }
    }

    /// Current value in `0..100`
    pub fn value(&self) -> u32 {
        self.shared.value.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.shared
            .running
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Start (or restart) ticking; returns the ticket needed to stop it
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> u64 {
        let ticket = self.shared.ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.value.store(0, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let events = self.events.clone();
        let tick = self.tick;
        let step = self.step;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.tick().await;
            loop {
                interval.tick().await;
                let value = (shared.value.load(Ordering::SeqCst) + step) % 100;
                shared.value.store(value, Ordering::SeqCst);
                events.emit(TourEvent::ProgressChanged {
                    value,
                    running: true,
                });
            }
        });

        if let Ok(mut running) = self.shared.running.lock() {
            if let Some(previous) = running.replace(handle) {
                previous.abort();
            }
        }

        debug!(ticket, "Progress started");
        self.events.emit(TourEvent::ProgressChanged {
            value: 0,
            running: true,
        });
        ticket
    }

    /// Stop ticking if `ticket` is still the latest; returns whether it stopped
    pub fn stop(&self, ticket: u64) -> bool {
        if self.shared.ticket.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "Progress stop ignored for superseded ticket");
            return false;
        }
        let handle = match self.shared.running.lock() {
            Ok(mut running) => running.take(),
            Err(_) => None,
        };
        let Some(handle) = handle else {
            return false;
        };
        handle.abort();
        self.shared.value.store(0, Ordering::SeqCst);
        self.events.emit(TourEvent::ProgressChanged {
            value: 0,
            running: false,
        });
        true
    }
}

impl Drop for ProgressIndicator {
    fn drop(&mut self) {
        if let Ok(mut running) = self.shared.running.lock() {
            if let Some(handle) = running.take() {
                handle.abort();
            }
        }
    }
}
