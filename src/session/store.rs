//! Session Store
//!
//! The single owner of the persisted theme and login session. Components
//! never read the storage medium directly; they go through this store and
//! subscribe to [`SessionStore::on_external_change`] for writes made by other
//! tabs. Synchronization is last-write-wins: listeners get told *that* a key
//! changed and re-read whatever they need.

use futures_util::FutureExt;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use super::error::StorageResult;
use super::storage::{StorageChange, TabStorage};
use super::types::{
    Credential, Session, ThemePreference, UserIdentity, SESSION_KEYS, THEME_KEY, TOKEN_KEY,
    USER_KEY,
};
use crate::runtime::Spawner;

/// Class present on the visual root while the dark theme is active
pub const DARK_MARKER: &str = "dark";

/// The operating environment's light/dark display preference
pub trait ColorSchemeProbe: Send + Sync {
    fn preferred_scheme(&self) -> Option<ThemePreference>;
}

/// Probe answering with a fixed value (configuration, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedColorScheme(pub Option<ThemePreference>);

impl ColorSchemeProbe for FixedColorScheme {
    fn preferred_scheme(&self) -> Option<ThemePreference> {
        self.0
    }
}

/// Global element that carries the theme marker class
pub trait VisualRoot: Send + Sync {
    fn set_marker(&self, class: &str, present: bool);
}

/// In-memory class list standing in for the document root
#[derive(Debug, Default)]
pub struct ClassList {
    classes: Mutex<BTreeSet<String>>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes
            .lock()
            .map(|classes| classes.contains(class))
            .unwrap_or(false)
    }
}

impl VisualRoot for ClassList {
    fn set_marker(&self, class: &str, present: bool) {
        if let Ok(mut classes) = self.classes.lock() {
            if present {
                classes.insert(class.to_string());
            } else {
                classes.remove(class);
            }
        }
    }
}

impl<T: VisualRoot + ?Sized> VisualRoot for Arc<T> {
    fn set_marker(&self, class: &str, present: bool) {
        (**self).set_marker(class, present)
    }
}

/// Handle returned by [`SessionStore::on_external_change`]
pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&StorageChange) + Send + Sync>;

/// Theme and session state for one tab
pub struct SessionStore {
    storage: TabStorage,
    probe: Box<dyn ColorSchemeProbe>,
    root: Box<dyn VisualRoot>,
    /// Environment answer, probed at most once
    scheme: OnceLock<Option<ThemePreference>>,
    listeners: Mutex<BTreeMap<ListenerId, Listener>>,
    next_listener: AtomicU64,
    /// Change feed; taken by the background sync task once it starts
    feed: Mutex<Option<broadcast::Receiver<StorageChange>>>,
}

impl SessionStore {
    pub fn new(
        storage: TabStorage,
        probe: impl ColorSchemeProbe + 'static,
        root: impl VisualRoot + 'static,
    ) -> Self {
        let feed = storage.changes();
        Self {
            storage,
            probe: Box::new(probe),
            root: Box::new(root),
            scheme: OnceLock::new(),
            listeners: Mutex::new(BTreeMap::new()),
            next_listener: AtomicU64::new(1),
            feed: Mutex::new(Some(feed)),
        }
    }

    pub fn storage(&self) -> &TabStorage {
        &self.storage
    }

    // ============ Theme ============

    /// Persisted theme if valid, else the environment's preference, else dark
    pub fn get_theme(&self) -> ThemePreference {
        if let Some(theme) = self
            .read(THEME_KEY)
            .and_then(|value| value.parse::<ThemePreference>().ok())
        {
            return theme;
        }

        self.environment_scheme().unwrap_or_default()
    }

    /// Persist `theme` and mirror it onto the visual root
    pub fn set_theme(&self, theme: ThemePreference) -> StorageResult<()> {
        self.storage.set(THEME_KEY, theme.as_str())?;
        self.root.set_marker(DARK_MARKER, theme.is_dark());
        tracing::debug!(theme = %theme, "Theme set");
        Ok(())
    }

    /// Flip the theme and return the new value
    pub fn toggle_theme(&self) -> StorageResult<ThemePreference> {
        let next = self.get_theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Re-apply the current theme to the visual root without writing
    pub fn apply_theme(&self) -> ThemePreference {
        let theme = self.get_theme();
        self.root.set_marker(DARK_MARKER, theme.is_dark());
        theme
    }

    fn environment_scheme(&self) -> Option<ThemePreference> {
        *self.scheme.get_or_init(|| {
            let scheme = self.probe.preferred_scheme();
            tracing::debug!(scheme = ?scheme, "Probed environment color scheme");
            scheme
        })
    }

    // ============ Session ============

    /// Current session, or `None` when logged out.
    ///
    /// A `user` value that is not a JSON object reads as logged out and is
    /// left in place.
    pub fn get_session(&self) -> Option<Session> {
        let raw = self.read(USER_KEY)?;
        let identity = match UserIdentity::from_json(&raw) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed persisted user");
                return None;
            }
        };

        Some(Session {
            identity,
            credential: self.read(TOKEN_KEY).map(Credential::new),
        })
    }

    /// Persist a session. Called by the login flow.
    pub fn set_session(&self, session: &Session) -> StorageResult<()> {
        let user = serde_json::to_string(&session.identity)?;
        self.storage.set(USER_KEY, &user)?;
        match &session.credential {
            Some(credential) => self.storage.set(TOKEN_KEY, credential.expose())?,
            None => self.storage.remove(TOKEN_KEY)?,
        }
        tracing::info!(user = %session.identity.display_name(), "Session stored");
        Ok(())
    }

    /// Remove identity and credential
    pub fn clear_session(&self) -> StorageResult<()> {
        self.storage.remove(USER_KEY)?;
        self.storage.remove(TOKEN_KEY)?;
        tracing::info!("Session cleared");
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = key, error = %e, "Failed to read persisted value");
                None
            }
        }
    }

    // ============ Cross-tab changes ============

    /// Register a listener for theme/session writes made by other tabs.
    ///
    /// Writes made through this store never reach its own listeners.
    pub fn on_external_change(
        &self,
        callback: impl Fn(&StorageChange) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.insert(id, Arc::new(callback));
        }
        id
    }

    /// Unregister a listener. Returns `false` if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners
            .lock()
            .map(|mut listeners| listeners.remove(&id).is_some())
            .unwrap_or(false)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Deliver a change to the listeners if it came from another tab.
    /// Returns whether it was delivered.
    pub fn dispatch(&self, change: &StorageChange) -> bool {
        if change.origin == self.storage.tab_id() {
            return false;
        }
        if !SESSION_KEYS.contains(&change.key.as_str()) {
            return false;
        }

        // Snapshot so listeners may (un)register while being called
        let listeners: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners.values().cloned().collect(),
            Err(_) => return false,
        };

        tracing::debug!(
            key = %change.key,
            origin = %change.origin,
            listeners = listeners.len(),
            "External storage change"
        );

        for listener in listeners {
            listener(change);
        }
        true
    }

    /// Drain queued changes without a runtime. Returns how many were delivered.
    ///
    /// Does nothing once [`spawn_external_sync`](Self::spawn_external_sync)
    /// owns the feed.
    pub fn dispatch_pending(&self) -> usize {
        let mut delivered = 0;
        let mut pending = Vec::new();

        if let Ok(mut feed) = self.feed.lock() {
            let Some(rx) = feed.as_mut() else {
                return 0;
            };
            loop {
                match rx.try_recv() {
                    Ok(change) => pending.push(change),
                    Err(TryRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped = skipped, "Storage change feed lagged");
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }

        for change in &pending {
            if self.dispatch(change) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Start delivering external changes in the background.
    ///
    /// Returns `false` if the feed was already taken.
    pub fn spawn_external_sync(self: &Arc<Self>, spawner: &dyn Spawner) -> bool {
        let rx = match self.feed.lock() {
            Ok(mut feed) => feed.take(),
            Err(_) => None,
        };
        let Some(mut rx) = rx else {
            return false;
        };

        let store = Arc::downgrade(self);
        spawner.spawn(
            async move {
                loop {
                    match rx.recv().await {
                        Ok(change) => match store.upgrade() {
                            Some(store) => {
                                store.dispatch(&change);
                            }
                            None => break,
                        },
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped = skipped, "Storage change feed lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
                tracing::debug!("External storage sync stopped");
            }
            .boxed(),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::StorageArea;
    use std::sync::atomic::AtomicUsize;

    fn store_with(
        area: &Arc<StorageArea>,
        scheme: Option<ThemePreference>,
    ) -> (SessionStore, Arc<ClassList>) {
        let root = Arc::new(ClassList::new());
        let store = SessionStore::new(area.open_tab(), FixedColorScheme(scheme), Arc::clone(&root));
        (store, root)
    }

    struct CountingProbe(Arc<AtomicUsize>);

    impl ColorSchemeProbe for CountingProbe {
        fn preferred_scheme(&self) -> Option<ThemePreference> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Some(ThemePreference::Light)
        }
    }

    #[test]
    fn test_theme_defaults_to_dark() {
        let area = StorageArea::in_memory();
        let (store, _) = store_with(&area, None);
        assert_eq!(store.get_theme(), ThemePreference::Dark);
    }

    #[test]
    fn test_theme_follows_environment_when_unset() {
        let area = StorageArea::in_memory();
        let (store, _) = store_with(&area, Some(ThemePreference::Light));
        assert_eq!(store.get_theme(), ThemePreference::Light);
    }

    #[test]
    fn test_persisted_theme_beats_environment() {
        let area = StorageArea::in_memory();
        area.open_tab().set(THEME_KEY, "dark").unwrap();

        let (store, _) = store_with(&area, Some(ThemePreference::Light));
        assert_eq!(store.get_theme(), ThemePreference::Dark);
    }

    #[test]
    fn test_invalid_persisted_theme_is_ignored() {
        let area = StorageArea::in_memory();
        area.open_tab().set(THEME_KEY, "sepia").unwrap();

        let (store, _) = store_with(&area, Some(ThemePreference::Light));
        assert_eq!(store.get_theme(), ThemePreference::Light);
    }

    #[test]
    fn test_environment_probed_once() {
        let area = StorageArea::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));
        let store = SessionStore::new(
            area.open_tab(),
            CountingProbe(Arc::clone(&calls)),
            ClassList::new(),
        );

        store.get_theme();
        store.get_theme();
        store.apply_theme();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_theme_applies_marker() {
        let area = StorageArea::in_memory();
        let (store, root) = store_with(&area, None);

        store.set_theme(ThemePreference::Dark).unwrap();
        assert!(root.contains(DARK_MARKER));

        // Idempotent
        store.set_theme(ThemePreference::Dark).unwrap();
        assert!(root.contains(DARK_MARKER));

        store.set_theme(ThemePreference::Light).unwrap();
        assert!(!root.contains(DARK_MARKER));
        assert_eq!(
            store.storage().get(THEME_KEY).unwrap().as_deref(),
            Some("light")
        );
    }

    #[test]
    fn test_toggle_theme_is_involution() {
        let area = StorageArea::in_memory();
        let (store, root) = store_with(&area, None);
        store.set_theme(ThemePreference::Light).unwrap();
        let marker_before = root.contains(DARK_MARKER);

        assert_eq!(store.toggle_theme().unwrap(), ThemePreference::Dark);
        assert_eq!(store.toggle_theme().unwrap(), ThemePreference::Light);

        assert_eq!(
            store.storage().get(THEME_KEY).unwrap().as_deref(),
            Some("light")
        );
        assert_eq!(root.contains(DARK_MARKER), marker_before);
    }

    #[test]
    fn test_session_round_trip_and_clear() {
        let area = StorageArea::in_memory();
        let (store, _) = store_with(&area, None);
        assert!(store.get_session().is_none());

        let session = Session::new(UserIdentity::new(7, "ada"), Credential::new("tok"));
        store.set_session(&session).unwrap();
        assert_eq!(store.get_session(), Some(session));

        store.clear_session().unwrap();
        assert!(store.get_session().is_none());
        assert_eq!(store.storage().get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_session_without_token() {
        let area = StorageArea::in_memory();
        let (store, _) = store_with(&area, None);
        store
            .storage()
            .set(USER_KEY, r#"{"id": 1, "username": "ada"}"#)
            .unwrap();

        let session = store.get_session().unwrap();
        assert_eq!(session.identity.username.as_deref(), Some("ada"));
        assert!(session.credential.is_none());
    }

    #[test]
    fn test_any_identity_object_is_a_session() {
        let area = StorageArea::in_memory();
        let (store, _) = store_with(&area, None);

        store.storage().set(USER_KEY, r#"{"id":"7","username":"ada"}"#).unwrap();
        let session = store.get_session().unwrap();
        assert_eq!(session.identity.display_name(), "ada");

        store.storage().set(USER_KEY, r#"{"id":7,"nickname":"ada"}"#).unwrap();
        let session = store.get_session().unwrap();
        assert_eq!(session.identity.username, None);
        assert_eq!(session.identity.display_name(), "ada");

        store.storage().set(USER_KEY, "42").unwrap();
        assert!(store.get_session().is_none());
    }

    #[test]
    fn test_malformed_user_reads_as_logged_out() {
        let area = StorageArea::in_memory();
        let (store, _) = store_with(&area, None);
        store.storage().set(USER_KEY, "{not json").unwrap();
        store.storage().set(TOKEN_KEY, "tok").unwrap();

        assert!(store.get_session().is_none());
        // Left in place
        assert_eq!(
            store.storage().get(USER_KEY).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn test_external_changes_skip_own_writes() {
        let area = StorageArea::in_memory();
        let (tab_a, _) = store_with(&area, None);
        let (tab_b, _) = store_with(&area, None);

        let seen_a = Arc::new(AtomicUsize::new(0));
        let seen_b = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen_a);
        tab_a.on_external_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&seen_b);
        tab_b.on_external_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tab_a.set_theme(ThemePreference::Light).unwrap();

        assert_eq!(tab_a.dispatch_pending(), 0);
        assert_eq!(tab_b.dispatch_pending(), 1);
        assert_eq!(seen_a.load(Ordering::SeqCst), 0);
        assert_eq!(seen_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unrelated_keys_are_not_delivered() {
        let area = StorageArea::in_memory();
        let (store, _) = store_with(&area, None);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        store.on_external_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        area.open_tab().set("api_url", "http://localhost").unwrap();
        area.inject_external("theme", Some("light".to_string()));

        assert_eq!(store.dispatch_pending(), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_registration_is_repeatable() {
        let area = StorageArea::in_memory();
        let (store, _) = store_with(&area, None);
        let seen = Arc::new(AtomicUsize::new(0));

        let first = {
            let counter = Arc::clone(&seen);
            store.on_external_change(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        };
        let second = {
            let counter = Arc::clone(&seen);
            store.on_external_change(move |_| {
                counter.fetch_add(10, Ordering::SeqCst);
            })
        };
        assert_ne!(first, second);
        assert_eq!(store.listener_count(), 2);

        assert!(store.remove_listener(first));
        assert!(!store.remove_listener(first));

        area.inject_external("user", None);
        store.dispatch_pending();
        assert_eq!(seen.load(Ordering::SeqCst), 10);

        assert!(store.remove_listener(second));
        area.inject_external("user", None);
        store.dispatch_pending();
        assert_eq!(seen.load(Ordering::SeqCst), 10);
    }

    #[cfg(feature = "native")]
    #[tokio::test]
    async fn test_background_sync_delivers_other_tab_writes() {
        use crate::runtime::TokioSpawner;
        use std::time::Duration;
        use tokio::sync::mpsc;

        let area = StorageArea::in_memory();
        let (writer, _) = store_with(&area, None);
        let (reader, reader_root) = store_with(&area, None);
        let reader = Arc::new(reader);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let observer = Arc::clone(&reader);
        reader.on_external_change(move |change| {
            // Consumers re-read state themselves
            observer.apply_theme();
            let _ = tx.send(change.key.clone());
        });

        assert!(reader.spawn_external_sync(&TokioSpawner));
        assert!(!reader.spawn_external_sync(&TokioSpawner));

        writer.set_theme(ThemePreference::Light).unwrap();

        let key = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(key, THEME_KEY);
        assert_eq!(reader.get_theme(), ThemePreference::Light);
        assert!(!reader_root.contains(DARK_MARKER));
    }
}
