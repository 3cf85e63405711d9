//! Suspension and Failure Boundaries
//!
//! The suspension boundary turns an unsettled load into a fallback; the
//! failure boundary contains anything that goes wrong inside its subtree,
//! load failures included, and offers a single recovery: reload the shell.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use super::error::{LoadError, RenderError};
use super::modules::{ModuleLoadState, ModuleLoader};
use super::screen::{Screen, ScreenId};

/// Result of looking through a suspension boundary
pub enum Suspense<T> {
    /// Still loading; show the loading indicator
    Fallback,
    Ready(T),
}

/// Suspends rendering of a subtree until its screen module is available
#[derive(Debug, Clone, Copy, Default)]
pub struct SuspenseBoundary;

impl SuspenseBoundary {
    /// Look up `id`, starting its load if nobody has yet.
    ///
    /// A failed load is raised so the enclosing failure boundary sees it.
    pub fn poll(
        &self,
        loader: &ModuleLoader,
        id: ScreenId,
    ) -> Result<Suspense<Arc<dyn Screen>>, LoadError> {
        match loader.request(id) {
            ModuleLoadState::Ready(screen) => Ok(Suspense::Ready(screen)),
            ModuleLoadState::Failed(e) => Err(e),
            ModuleLoadState::Pending | ModuleLoadState::Unrequested => Ok(Suspense::Fallback),
        }
    }
}

/// An error contained by a failure boundary
#[derive(Debug, Clone, PartialEq)]
pub struct CaughtError {
    pub message: String,
    /// Rendering context, outermost first
    pub trace: Vec<String>,
    pub caught_at: DateTime<Utc>,
}

/// State of a failure boundary
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BoundaryState {
    #[default]
    Ok,
    Failed(CaughtError),
}

/// The only recovery the fallback offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    ReloadApplication,
}

/// What the user sees in place of a failed subtree
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackCard {
    pub title: String,
    pub message: String,
    /// Error message and trace; development builds only
    pub detail: Option<String>,
    pub action: RetryAction,
}

/// Contains render and load failures of its subtree
#[derive(Debug)]
pub struct FailureBoundary {
    name: &'static str,
    dev_mode: bool,
    state: BoundaryState,
}

impl FailureBoundary {
    pub fn new(name: &'static str, dev_mode: bool) -> Self {
        Self {
            name,
            dev_mode,
            state: BoundaryState::Ok,
        }
    }

    pub fn state(&self) -> &BoundaryState {
        &self.state
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, BoundaryState::Failed(_))
    }

    /// Render the subtree through the boundary.
    ///
    /// Errors and panics never reach the caller: the boundary records them
    /// and answers with its fallback. Once failed, the subtree is not rendered
    /// again until [`reset`](Self::reset).
    pub fn catch<T>(
        &mut self,
        trace: &[String],
        render: impl FnOnce() -> Result<T, RenderError>,
    ) -> Result<T, FallbackCard> {
        if let BoundaryState::Failed(_) = self.state {
            return Err(self.fallback_card());
        }

        let error = match catch_unwind(AssertUnwindSafe(render)) {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(payload) => RenderError::Panicked(panic_message(payload.as_ref())),
        };

        let mut full_trace = vec![self.name.to_string()];
        full_trace.extend(trace.iter().cloned());

        tracing::error!(
            boundary = self.name,
            error = %error,
            trace = %full_trace.join(" > "),
            "Subtree failed"
        );

        self.state = BoundaryState::Failed(CaughtError {
            message: error.to_string(),
            trace: full_trace,
            caught_at: Utc::now(),
        });

        Err(self.fallback_card())
    }

    /// Fallback for the current state, if failed
    pub fn fallback(&self) -> Option<FallbackCard> {
        self.is_failed().then(|| self.fallback_card())
    }

    pub fn reset(&mut self) {
        self.state = BoundaryState::Ok;
    }

    fn fallback_card(&self) -> FallbackCard {
        let detail = match (&self.state, self.dev_mode) {
            (BoundaryState::Failed(caught), true) => Some(format!(
                "{}\n  at {}",
                caught.message,
                caught.trace.join("\n  at ")
            )),
            _ => None,
        };

        FallbackCard {
            title: "Something went wrong".to_string(),
            message: "This page could not be displayed. Reload to try again.".to_string(),
            detail,
            action: RetryAction::ReloadApplication,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
