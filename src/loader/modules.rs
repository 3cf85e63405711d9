//! Module Loader
//!
//! On-demand screen loading with one shared in-flight load per screen.
//!
//! ```text
//! request(id) ──► slot missing? ──► spawn load task ──► Pending(watch rx)
//!                                          │
//!                       settles ──► Ready(screen) | Failed(error) ──► waiters
//! ```
//!
//! Loads run on the [`Spawner`], not on the caller, so a screen the user has
//! navigated away from still finishes loading in the background. Waiters are
//! free to drop their future at any time.

use futures_util::FutureExt;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use super::error::LoadError;
use super::screen::{Screen, ScreenId, ScreenRegistry};
use crate::runtime::Spawner;

type Settled = Option<Result<Arc<dyn Screen>, LoadError>>;

/// Observable load state of one screen
#[derive(Clone)]
pub enum ModuleLoadState {
    Unrequested,
    Pending,
    Ready(Arc<dyn Screen>),
    Failed(LoadError),
}

impl ModuleLoadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ModuleLoadState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModuleLoadState::Ready(_))
    }
}

impl fmt::Debug for ModuleLoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleLoadState::Unrequested => f.write_str("Unrequested"),
            ModuleLoadState::Pending => f.write_str("Pending"),
            ModuleLoadState::Ready(screen) => write!(f, "Ready({})", screen.id()),
            ModuleLoadState::Failed(e) => write!(f, "Failed({})", e),
        }
    }
}

enum Slot {
    Pending(watch::Receiver<Settled>),
    Ready(Arc<dyn Screen>),
    Failed(LoadError),
}

impl Slot {
    fn state(&self) -> ModuleLoadState {
        match self {
            Slot::Pending(_) => ModuleLoadState::Pending,
            Slot::Ready(screen) => ModuleLoadState::Ready(Arc::clone(screen)),
            Slot::Failed(e) => ModuleLoadState::Failed(e.clone()),
        }
    }
}

/// Per-screen load cache
pub struct ModuleLoader {
    registry: ScreenRegistry,
    spawner: Arc<dyn Spawner>,
    slots: Arc<Mutex<HashMap<ScreenId, Slot>>>,
    /// Bumped by `reset`; loads started under an older epoch never land
    epoch: Arc<AtomicU64>,
}

impl ModuleLoader {
    pub fn new(registry: ScreenRegistry, spawner: Arc<dyn Spawner>) -> Self {
        Self {
            registry,
            spawner,
            slots: Arc::new(Mutex::new(HashMap::new())),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current state without starting anything
    pub fn state(&self, id: ScreenId) -> ModuleLoadState {
        self.slots
            .lock()
            .ok()
            .and_then(|slots| slots.get(&id).map(Slot::state))
            .unwrap_or(ModuleLoadState::Unrequested)
    }

    /// Start the load for `id` unless one exists, and return its state
    pub fn request(&self, id: ScreenId) -> ModuleLoadState {
        let mut slots = match self.slots.lock() {
            Ok(slots) => slots,
            Err(_) => return ModuleLoadState::Failed(LoadError::Abandoned),
        };

        if let Some(slot) = slots.get(&id) {
            return slot.state();
        }

        let Some(source) = self.registry.get(id) else {
            let error = LoadError::NotRegistered(id);
            tracing::warn!(screen = %id, "No loader registered");
            slots.insert(id, Slot::Failed(error.clone()));
            return ModuleLoadState::Failed(error);
        };

        let (tx, rx) = watch::channel(None);
        slots.insert(id, Slot::Pending(rx));
        let started_in = self.epoch.load(Ordering::SeqCst);
        drop(slots);

        tracing::debug!(screen = %id, "Screen load started");

        let slots = Arc::clone(&self.slots);
        let epoch = Arc::clone(&self.epoch);

        self.spawner.spawn(
            async move {
                let result = match AssertUnwindSafe(source.load()).catch_unwind().await {
                    Ok(result) => result,
                    Err(_) => Err(LoadError::Fetch(format!("loader for '{}' panicked", id))),
                };

                match &result {
                    Ok(_) => tracing::debug!(screen = %id, "Screen load settled"),
                    Err(e) => tracing::debug!(screen = %id, error = %e, "Screen load failed"),
                }

                // reset() bumps the epoch under this same lock
                if let Ok(mut slots) = slots.lock() {
                    if epoch.load(Ordering::SeqCst) == started_in {
                        let slot = match &result {
                            Ok(screen) => Slot::Ready(Arc::clone(screen)),
                            Err(e) => Slot::Failed(e.clone()),
                        };
                        slots.insert(id, slot);
                    }
                }

                // Waiters may all be gone; that is fine
                let _ = tx.send(Some(result));
            }
            .boxed(),
        );

        ModuleLoadState::Pending
    }

    /// Wait until the screen's load settles, starting it if needed
    pub async fn resolve(&self, id: ScreenId) -> Result<Arc<dyn Screen>, LoadError> {
        let mut rx = match self.request(id) {
            ModuleLoadState::Ready(screen) => return Ok(screen),
            ModuleLoadState::Failed(e) => return Err(e),
            ModuleLoadState::Pending | ModuleLoadState::Unrequested => {
                let slots = self.slots.lock().map_err(|_| LoadError::Abandoned)?;
                match slots.get(&id) {
                    Some(Slot::Pending(rx)) => rx.clone(),
                    Some(Slot::Ready(screen)) => return Ok(Arc::clone(screen)),
                    Some(Slot::Failed(e)) => return Err(e.clone()),
                    None => return Err(LoadError::Abandoned),
                }
            }
        };

        let settled = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| LoadError::Abandoned)?;

        match settled.as_ref() {
            Some(result) => result.clone(),
            None => Err(LoadError::Abandoned),
        }
    }

    /// Number of loads still in flight
    pub fn pending_count(&self) -> usize {
        self.slots
            .lock()
            .map(|slots| {
                slots
                    .values()
                    .filter(|slot| matches!(slot, Slot::Pending(_)))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Forget every cached module and failure
    pub fn reset(&self) {
        if let Ok(mut slots) = self.slots.lock() {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            slots.clear();
        }
        tracing::debug!("Module cache reset");
    }
}
