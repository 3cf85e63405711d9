//! Task Spawning
//!
//! The shell never blocks on background work: screen loads and visit events
//! are handed to a [`Spawner`]. Natively this is tokio; the browser build
//! provides its own implementation on top of `spawn_local`.

use futures_util::future::BoxFuture;

/// Runs detached background tasks
pub trait Spawner: Send + Sync {
    /// Start a task without waiting for it
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

/// Spawner backed by the ambient tokio runtime
#[cfg(feature = "native")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

#[cfg(feature = "native")]
impl Spawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        tokio::spawn(task);
    }
}
