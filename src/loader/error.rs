//! Loader and rendering error types

use thiserror::Error;

use super::screen::ScreenId;

/// A screen's module could not be obtained
///
/// Cloneable: every waiter on a shared load receives the same error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// No source registered for the screen
    #[error("No loader registered for screen '{0}'")]
    NotRegistered(ScreenId),

    /// The source failed to produce the module
    #[error("Failed to load screen: {0}")]
    Fetch(String),

    /// The load task went away without settling
    #[error("Screen load abandoned")]
    Abandoned,
}

/// Any error raised while building a subtree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The screen reported a failure
    #[error("Render failed: {0}")]
    Failed(String),

    /// The screen's module never arrived
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Rendering panicked
    #[error("Render panicked: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::NotRegistered(ScreenId::new("weight"));
        assert_eq!(err.to_string(), "No loader registered for screen 'weight'");

        let err: RenderError = LoadError::Fetch("chunk 404".to_string()).into();
        assert_eq!(err.to_string(), "Failed to load screen: chunk 404");
    }
}
