//! Screens and Their Sources
//!
//! A screen is one on-demand unit of page content. The shell only knows how
//! to obtain it (a [`ScreenSource`]) and how to ask it for output; what a
//! screen actually shows is the content pages' business.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::error::{LoadError, RenderError};
use crate::session::UserIdentity;

/// Identifier of a screen, shared by the route table and the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(&'static str);

impl ScreenId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.0)
    }
}

/// What a screen gets to render with
#[derive(Debug, Clone, Default)]
pub struct ScreenContext {
    pub path: String,
    /// Values of `:name` segments (and `*` for a wildcard tail)
    pub params: BTreeMap<String, String>,
    pub identity: Option<UserIdentity>,
}

impl ScreenContext {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Committed output of a screen
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenOutput {
    pub screen: ScreenId,
    pub title: String,
    pub body: String,
}

/// A loaded screen module
pub trait Screen: Send + Sync {
    fn id(&self) -> ScreenId;

    fn render(&self, cx: &ScreenContext) -> Result<ScreenOutput, RenderError>;
}

/// Deferred loader for one screen
#[async_trait]
pub trait ScreenSource: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Screen>, LoadError>;
}

/// Stand-in screen that renders its title and route parameters
#[derive(Debug, Clone)]
pub struct PlaceholderScreen {
    id: ScreenId,
    title: String,
}

impl PlaceholderScreen {
    pub fn new(id: ScreenId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

impl Screen for PlaceholderScreen {
    fn id(&self) -> ScreenId {
        self.id
    }

    fn render(&self, cx: &ScreenContext) -> Result<ScreenOutput, RenderError> {
        let mut body = format!("{} at {}", self.title, cx.path);
        if !cx.params.is_empty() {
            let params: Vec<String> = cx
                .params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            body.push_str(&format!(" ({})", params.join(", ")));
        }

        Ok(ScreenOutput {
            screen: self.id,
            title: self.title.clone(),
            body,
        })
    }
}

/// Source that hands out an already-built screen
pub struct StaticSource(Arc<dyn Screen>);

impl StaticSource {
    pub fn new(screen: impl Screen + 'static) -> Self {
        Self(Arc::new(screen))
    }
}

#[async_trait]
impl ScreenSource for StaticSource {
    async fn load(&self) -> Result<Arc<dyn Screen>, LoadError> {
        Ok(Arc::clone(&self.0))
    }
}

/// Source backed by an async closure
pub struct FnSource<F>(F);

/// Wrap an async closure as a [`ScreenSource`]
pub fn source_fn<F, Fut>(f: F) -> FnSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Arc<dyn Screen>, LoadError>> + Send,
{
    FnSource(f)
}

#[async_trait]
impl<F, Fut> ScreenSource for FnSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Arc<dyn Screen>, LoadError>> + Send,
{
    async fn load(&self) -> Result<Arc<dyn Screen>, LoadError> {
        (self.0)().await
    }
}

/// Screen identifier → source
#[derive(Clone, Default)]
pub struct ScreenRegistry {
    sources: HashMap<ScreenId, Arc<dyn ScreenSource>>,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the source for a screen
    pub fn register(mut self, id: ScreenId, source: impl ScreenSource + 'static) -> Self {
        self.sources.insert(id, Arc::new(source));
        self
    }

    /// Register a placeholder for every screen named in `screens`
    pub fn with_placeholders<'a>(
        mut self,
        screens: impl IntoIterator<Item = (ScreenId, &'a str)>,
    ) -> Self {
        for (id, title) in screens {
            self.sources
                .entry(id)
                .or_insert_with(|| Arc::new(StaticSource::new(PlaceholderScreen::new(id, title))));
        }
        self
    }

    pub fn get(&self, id: ScreenId) -> Option<Arc<dyn ScreenSource>> {
        self.sources.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABOUT: ScreenId = ScreenId::new("about");
    const POST: ScreenId = ScreenId::new("post");

    #[test]
    fn test_placeholder_render() {
        let screen = PlaceholderScreen::new(POST, "Post");
        let mut cx = ScreenContext {
            path: "/post/42".to_string(),
            ..Default::default()
        };
        cx.params.insert("id".to_string(), "42".to_string());

        let output = screen.render(&cx).unwrap();
        assert_eq!(output.screen, POST);
        assert_eq!(output.body, "Post at /post/42 (id=42)");
        assert_eq!(cx.param("id"), Some("42"));
    }

    #[test]
    fn test_screen_id_respects_width() {
        assert_eq!(format!("[{:<6}]", ABOUT), "[about ]");
        assert_eq!(format!("[{:>6}]", POST), "[  post]");
    }

    #[test]
    fn test_registry_placeholders_do_not_replace() {
        let registry = ScreenRegistry::new()
            .register(ABOUT, StaticSource::new(PlaceholderScreen::new(ABOUT, "Custom")))
            .with_placeholders([(ABOUT, "About"), (POST, "Post")]);

        assert_eq!(registry.len(), 2);
        assert!(registry.get(ScreenId::new("missing")).is_none());
    }

    #[tokio::test]
    async fn test_fn_source() {
        let source = source_fn(|| async {
            Err::<Arc<dyn Screen>, _>(LoadError::Fetch("offline".to_string()))
        });
        assert!(matches!(source.load().await, Err(LoadError::Fetch(_))));

        let source = StaticSource::new(PlaceholderScreen::new(ABOUT, "About"));
        assert_eq!(source.load().await.unwrap().id(), ABOUT);
    }
}
