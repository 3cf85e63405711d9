//! Screen Loading
//!
//! On-demand screen modules and the boundaries around them:
//!
//! - **screen**: Screen trait, deferred sources and the registry
//! - **modules**: `ModuleLoader`, one shared in-flight load per screen
//! - **boundary**: Suspension (loading fallback) and failure (error card)
//! - **error**: Load and render errors
//!
//! # Architecture
//!
//! ```text
//! FailureBoundary
//!   └─ SuspenseBoundary ── Pending ──► loading indicator
//!        └─ Screen::render ── Err / panic / load failure ──► fallback card
//! ```

pub mod boundary;
pub mod error;
pub mod modules;
pub mod screen;

pub use boundary::{
    BoundaryState, CaughtError, FailureBoundary, FallbackCard, RetryAction, Suspense,
    SuspenseBoundary,
};
pub use error::{LoadError, RenderError};
pub use modules::{ModuleLoadState, ModuleLoader};
pub use screen::{
    source_fn, FnSource, PlaceholderScreen, Screen, ScreenContext, ScreenId, ScreenOutput,
    ScreenRegistry, ScreenSource, StaticSource,
};
