//! UI Components
//!
//! Page chrome and the outlet states rendered from the shell's frame.

pub mod error_card;
pub mod loading;
pub mod nav;
pub mod sidebar;

pub use error_card::ErrorCard;
pub use loading::Loading;
pub use nav::{MenuLink, Nav};
pub use sidebar::Sidebar;
