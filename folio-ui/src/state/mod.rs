//! State Management
//!
//! The mounted shell and the reactive frame it renders into.

pub mod global;

pub use global::{provide_global_state, GlobalState};
