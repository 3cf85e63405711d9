//! Browser Bindings
//!
//! Implementations of the shell's environment seams on top of `web_sys`:
//! localStorage, `matchMedia`, the document root's class list, the `storage`
//! event and `fetch`. None of them hold JS handles, so they satisfy the
//! core's `Send + Sync` bounds; every call looks the object up again.

use async_trait::async_trait;
use folio_shell::session::{
    ColorSchemeProbe, SessionStore, StorageArea, StorageBackend, StorageError, StorageResult,
    ThemePreference, VisualRoot, SESSION_KEYS,
};
use folio_shell::visits::{TransportError, VisitEvent, VisitTransport};
use folio_shell::{RouteTable, ScreenRegistry, Shell, ShellOptions, ShellParts, Spawner};
use futures_util::future::BoxFuture;
use gloo_net::http::Request;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::StorageEvent;

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "/api";

/// localStorage key overriding the API base URL
const API_BASE_KEY: &str = "folio_api_url";

fn js_error(e: JsValue) -> StorageError {
    StorageError::Unavailable(format!("{:?}", e))
}

fn local_storage() -> StorageResult<web_sys::Storage> {
    web_sys::window()
        .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?
        .local_storage()
        .map_err(js_error)?
        .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))
}

/// The origin's localStorage
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageBackend;

impl StorageBackend for LocalStorageBackend {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        local_storage()?.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        local_storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        local_storage()?.remove_item(key).map_err(js_error)
    }
}

/// `prefers-color-scheme` media query
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchMediaProbe;

impl MatchMediaProbe {
    fn matches(query: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.match_media(query).ok().flatten())
            .map(|list| list.matches())
            .unwrap_or(false)
    }
}

impl ColorSchemeProbe for MatchMediaProbe {
    fn preferred_scheme(&self) -> Option<ThemePreference> {
        if Self::matches("(prefers-color-scheme: light)") {
            Some(ThemePreference::Light)
        } else if Self::matches("(prefers-color-scheme: dark)") {
            Some(ThemePreference::Dark)
        } else {
            None
        }
    }
}

/// `<html>` element of the document
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentRoot;

impl VisualRoot for DocumentRoot {
    fn set_marker(&self, class: &str, present: bool) {
        let root = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element());

        if let Some(root) = root {
            if let Err(e) = root.class_list().toggle_with_force(class, present) {
                web_sys::console::error_1(&format!("Failed to set theme class: {:?}", e).into());
            }
        }
    }
}

/// Runs tasks on the browser's microtask queue
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSpawner;

impl Spawner for LocalSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// Posts visit events with `fetch`.
///
/// The request is started on the local executor and the call returns at
/// once, so the shell never holds a (non-`Send`) browser future.
pub struct FetchVisitTransport {
    endpoint: String,
}

impl FetchVisitTransport {
    pub fn new(api_base: &str) -> Self {
        Self {
            endpoint: format!("{}/visits", api_base.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl VisitTransport for FetchVisitTransport {
    async fn record_visit(&self, event: &VisitEvent) -> Result<(), TransportError> {
        let request = Request::post(&self.endpoint)
            .json(event)
            .map_err(|e| TransportError::Other(format!("Request build error: {}", e)))?;

        wasm_bindgen_futures::spawn_local(async move {
            match request.send().await {
                Ok(response) if !response.ok() => {
                    web_sys::console::debug_1(
                        &format!("Visit not recorded: HTTP {}", response.status()).into(),
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    web_sys::console::debug_1(&format!("Visit not recorded: {}", e).into());
                }
            }
        });

        Ok(())
    }
}

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = local_storage()
        .ok()
        .and_then(|storage| storage.get_item(API_BASE_KEY).ok().flatten())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    url.trim_end_matches('/').to_string()
}

/// Forward `storage` events from other tabs into the area's change feed
pub fn bridge_storage_events(area: &Arc<StorageArea>) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let area = Arc::clone(area);
    let on_storage = Closure::wrap(Box::new(move |event: StorageEvent| match event.key() {
        Some(key) => area.inject_external(&key, event.new_value()),
        // localStorage.clear() in another tab
        None => {
            for key in SESSION_KEYS {
                area.inject_external(key, None);
            }
        }
    }) as Box<dyn FnMut(StorageEvent)>);

    if let Err(e) =
        window.add_event_listener_with_callback("storage", on_storage.as_ref().unchecked_ref())
    {
        web_sys::console::error_1(&format!("Failed to watch storage events: {:?}", e).into());
    }
    on_storage.forget();
}

fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// Assemble the shell from the browser environment
pub fn mount_shell() -> Arc<Shell> {
    let area = StorageArea::new(LocalStorageBackend);
    bridge_storage_events(&area);

    let session = Arc::new(SessionStore::new(
        area.open_tab(),
        MatchMediaProbe,
        DocumentRoot,
    ));

    let routes = RouteTable::standard();
    let registry = ScreenRegistry::new().with_placeholders(routes.screens());
    let api_base = get_api_base();
    web_sys::console::log_1(&format!("Folio API: {}", api_base).into());

    Shell::mount(
        ShellParts {
            session,
            routes,
            registry,
            transport: Arc::new(FetchVisitTransport::new(&api_base)),
            spawner: Arc::new(LocalSpawner),
            options: ShellOptions {
                dev_mode: cfg!(debug_assertions),
                ..ShellOptions::default()
            },
        },
        &current_path(),
    )
}
