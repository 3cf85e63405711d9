//! Routing
//!
//! - **table**: The static route table and path matching
//! - **guard**: Session gate for the protected routes

pub mod guard;
pub mod table;

pub use guard::{GuardDecision, GuardState, RouteGuard, DEFAULT_LOGIN_PATH};
pub use table::{
    normalize_path, screens, RouteEntry, RouteMatch, RouteTable, DEFAULT_PROTECTED_PREFIX,
};

use std::fmt;

/// Identifies one navigation. Re-rendering keeps the id; navigating again,
/// even to the same path, gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NavigationId(pub u64);

impl fmt::Display for NavigationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nav-{}", self.0)
    }
}
