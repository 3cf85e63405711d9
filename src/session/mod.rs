//! Session Store
//!
//! Persisted theme preference and login session, shared across tabs:
//!
//! - **types**: Theme, identity, credential and session values
//! - **storage**: Backends, the origin-wide storage area and its change feed
//! - **store**: The per-tab `SessionStore` every component talks to
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust
//! use folio_shell::session::*;
//!
//! let area = StorageArea::in_memory();
//! let store = SessionStore::new(area.open_tab(), FixedColorScheme(None), ClassList::new());
//!
//! assert_eq!(store.get_theme(), ThemePreference::Dark);
//! assert!(store.get_session().is_none());
//! ```

pub mod error;
pub mod storage;
pub mod store;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use storage::{
    FileBackend, MemoryBackend, StorageArea, StorageBackend, StorageChange, TabId, TabStorage,
};
pub use store::{
    ClassList, ColorSchemeProbe, FixedColorScheme, ListenerId, SessionStore, VisualRoot,
    DARK_MARKER,
};
pub use types::{
    Credential, Session, ThemePreference, UserIdentity, SESSION_KEYS, THEME_KEY, TOKEN_KEY,
    USER_KEY,
};
