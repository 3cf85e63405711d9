//! # Folio Shell
//!
//! Client-side orchestration core for a personal blog and portfolio site.
//! Everything a page needs around its content: persisted theme and session,
//! guarded routes, on-demand screen loading with loading and failure
//! fallbacks, page-view recording and the hover menu.
//!
//! ## Features
//!
//! - **Session store**: Theme and login session in origin-wide key-value
//!   storage, with cross-tab change notifications
//! - **Route guard**: Protected pages redirect to login without ever loading
//! - **Screen loader**: One shared load per screen, suspension and failure
//!   boundaries
//! - **Visit recorder**: Fire-and-forget page-view events
//! - **Navigation menu**: Hover dropdowns and the admin sidebar
//!
//! ## Modules
//!
//! - [`session`]: Session store and storage backends
//! - [`routing`]: Route table and guard
//! - [`loader`]: Screen modules and boundaries
//! - [`visits`]: Visit recorder and transports
//! - [`menu`]: Navigation menu
//! - [`shell`]: The composed application shell
//! - [`config`]: Configuration loading
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use folio_shell::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let area = StorageArea::in_memory();
//!     let session = Arc::new(SessionStore::new(
//!         area.open_tab(),
//!         FixedColorScheme(None),
//!         ClassList::new(),
//!     ));
//!
//!     let routes = RouteTable::standard();
//!     let registry = ScreenRegistry::new().with_placeholders(routes.screens());
//!
//!     let shell = Shell::mount(
//!         ShellParts {
//!             session,
//!             routes,
//!             registry,
//!             transport: Arc::new(HttpVisitTransport::new("http://localhost:8080/api", None)?),
//!             spawner: Arc::new(TokioSpawner),
//!             options: ShellOptions::default(),
//!         },
//!         "/",
//!     );
//!
//!     shell.navigate("/dashboard");
//!     if let Some(frame) = shell.settle().await {
//!         println!("{} -> {:?}", frame.path, frame.outlet);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod loader;
pub mod menu;
pub mod routing;
pub mod runtime;
pub mod session;
pub mod shell;
pub mod visits;

// Re-export top-level types for convenience
pub use session::{
    ClassList, ColorSchemeProbe, Credential, FileBackend, FixedColorScheme, MemoryBackend,
    Session, SessionStore, StorageArea, StorageBackend, StorageChange, StorageError,
    StorageResult, TabId, ThemePreference, UserIdentity, VisualRoot,
};

pub use routing::{
    normalize_path, screens, GuardDecision, GuardState, NavigationId, RouteEntry, RouteGuard,
    RouteTable,
};

pub use loader::{
    BoundaryState, FailureBoundary, FallbackCard, LoadError, ModuleLoadState, ModuleLoader,
    PlaceholderScreen, RenderError, Screen, ScreenContext, ScreenId, ScreenOutput,
    ScreenRegistry, ScreenSource, SuspenseBoundary,
};

pub use visits::{TransportError, VisitConfig, VisitEvent, VisitRecorder, VisitTransport};

#[cfg(feature = "native")]
pub use visits::HttpVisitTransport;

pub use menu::{MenuEntry, MenuItemView, MenuState, NavigationMenu, SITE_MENU};

pub use runtime::Spawner;

#[cfg(feature = "native")]
pub use runtime::TokioSpawner;

pub use shell::{Chrome, Frame, Navigation, Outlet, Shell, ShellOptions, ShellParts};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};
