//! Visit Recorder
//!
//! Best-effort page-view analytics. One event per navigation, sent without
//! waiting, never retried; a lost event must never be noticed by the visitor.

use async_trait::async_trait;
use futures_util::FutureExt;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::routing::NavigationId;
use crate::runtime::Spawner;

/// One page view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitEvent {
    pub path: String,
}

/// Where visit events go
#[async_trait]
pub trait VisitTransport: Send + Sync {
    async fn record_visit(&self, event: &VisitEvent) -> Result<(), TransportError>;
}

/// Errors from a visit transport. Logged, never surfaced.
#[derive(Debug, Error)]
pub enum TransportError {
    #[cfg(feature = "native")]
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Other(String),
}

/// Posts visit events to the blog API
#[cfg(feature = "native")]
pub struct HttpVisitTransport {
    client: reqwest::Client,
    endpoint: String,
}

#[cfg(feature = "native")]
impl HttpVisitTransport {
    /// `api_base` is the API root, e.g. `http://localhost:8080/api`
    pub fn new(api_base: &str, timeout: Option<std::time::Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: format!("{}/visits", api_base.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(feature = "native")]
#[async_trait]
impl VisitTransport for HttpVisitTransport {
    async fn record_visit(&self, event: &VisitEvent) -> Result<(), TransportError> {
        let response = self.client.post(&self.endpoint).json(event).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(TransportError::Status(response.status().as_u16()))
        }
    }
}

/// Visit recorder configuration
#[derive(Debug, Clone)]
pub struct VisitConfig {
    pub enabled: bool,
    /// Paths starting with any of these are never recorded
    pub excluded_prefixes: Vec<String>,
}

impl Default for VisitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            excluded_prefixes: Vec::new(),
        }
    }
}

impl VisitConfig {
    /// Add exclusions, skipping prefixes already listed
    pub fn excluding<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for prefix in prefixes {
            let prefix = prefix.into();
            if !self.excluded_prefixes.contains(&prefix) {
                self.excluded_prefixes.push(prefix);
            }
        }
        self
    }
}

/// Passive navigation observer emitting visit events
pub struct VisitRecorder {
    transport: Arc<dyn VisitTransport>,
    spawner: Arc<dyn Spawner>,
    config: VisitConfig,
    last_navigation: Mutex<Option<NavigationId>>,
}

impl VisitRecorder {
    pub fn new(
        transport: Arc<dyn VisitTransport>,
        spawner: Arc<dyn Spawner>,
        config: VisitConfig,
    ) -> Self {
        Self {
            transport,
            spawner,
            config,
            last_navigation: Mutex::new(None),
        }
    }

    /// Whether a navigation to `path` produces an event.
    ///
    /// Plain string prefixes: `/login` also excludes `/login-help`.
    pub fn should_record(&self, path: &str) -> bool {
        self.config.enabled
            && !self
                .config
                .excluded_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Observe a completed navigation. Returns whether an event was sent off.
    ///
    /// Calling again with the same navigation id (a re-render) is a no-op.
    pub fn on_navigation(&self, navigation: NavigationId, path: &str) -> bool {
        if let Ok(mut last) = self.last_navigation.lock() {
            if *last == Some(navigation) {
                return false;
            }
            *last = Some(navigation);
        }

        if !self.should_record(path) {
            return false;
        }

        let transport = Arc::clone(&self.transport);
        let event = VisitEvent {
            path: path.to_string(),
        };

        self.spawner.spawn(
            async move {
                if let Err(e) = transport.record_visit(&event).await {
                    tracing::debug!(path = %event.path, error = %e, "Visit not recorded");
                }
            }
            .boxed(),
        );

        true
    }
}
