//! Route Guard
//!
//! Decides whether a protected subtree may render. It looks at session
//! presence only; whether the credential is still accepted is the API
//! client's problem.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::session::Session;

/// Default login entry point
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Guard state of one protected entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Denied,
    Allowed,
}

/// Outcome of evaluating the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Render nothing of the protected subtree and go to `to` instead
    Redirect { to: String, from: String },
}

/// Gate in front of the protected routes
#[derive(Debug)]
pub struct RouteGuard {
    login_path: String,
    states: Mutex<HashMap<String, GuardState>>,
}

impl RouteGuard {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            states: Mutex::new(HashMap::new()),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Evaluate the guard for a protected entry.
    ///
    /// Must be called on every navigation into a protected path; the
    /// previous state of `key` is never trusted.
    pub fn evaluate(&self, key: &str, path: &str, session: Option<&Session>) -> GuardDecision {
        let next = match session {
            Some(_) => GuardState::Allowed,
            None => GuardState::Denied,
        };

        if let Ok(mut states) = self.states.lock() {
            let previous = states.insert(key.to_string(), next);
            if previous != Some(next) {
                tracing::debug!(route = key, from = ?previous, to = ?next, "Guard transition");
            }
        }

        match next {
            GuardState::Allowed => GuardDecision::Allow,
            GuardState::Denied => GuardDecision::Redirect {
                to: self.login_path.clone(),
                from: path.to_string(),
            },
        }
    }

    /// Last evaluated state of a protected entry
    pub fn state(&self, key: &str) -> Option<GuardState> {
        self.states.lock().ok().and_then(|s| s.get(key).copied())
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_PATH)
    }
}
