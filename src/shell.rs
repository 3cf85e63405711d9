//! Shell
//!
//! Composes the session store, route guard, visit recorder, menu and module
//! loader around the route table. The shell owns no state of its own beyond
//! wiring and the current location.
//!
//! # Layout
//!
//! ```text
//! Chrome (menu, theme, identity, admin sidebar)     ← never inside a boundary
//! FailureBoundary("App")
//!   └─ SuspenseBoundary
//!        └─ route table → screen
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::collections::BTreeMap;

use crate::loader::{
    BoundaryState, FailureBoundary, FallbackCard, ModuleLoader, ScreenContext, ScreenId,
    ScreenOutput, ScreenRegistry, Suspense, SuspenseBoundary,
};
use crate::menu::{admin_sidebar, LinkView, MenuItemView, MenuState, NavigationMenu};
use crate::routing::{
    normalize_path, GuardDecision, NavigationId, RouteGuard, RouteTable, DEFAULT_LOGIN_PATH,
};
use crate::runtime::Spawner;
use crate::session::{
    ListenerId, SessionStore, StorageChange, StorageResult, ThemePreference, UserIdentity,
    THEME_KEY, TOKEN_KEY, USER_KEY,
};
use crate::visits::{VisitConfig, VisitRecorder, VisitTransport};

/// Shell behavior switches
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Show error detail on the fallback card
    pub dev_mode: bool,
    pub login_path: String,
    pub visits: VisitConfig,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            dev_mode: false,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            visits: VisitConfig::default(),
        }
    }
}

/// Everything the shell is assembled from
pub struct ShellParts {
    pub session: Arc<SessionStore>,
    pub routes: RouteTable,
    pub registry: ScreenRegistry,
    pub transport: Arc<dyn VisitTransport>,
    pub spawner: Arc<dyn Spawner>,
    pub options: ShellOptions,
}

/// Page chrome around the routed content
#[derive(Debug, Clone, PartialEq)]
pub struct Chrome {
    pub theme: ThemePreference,
    pub identity: Option<UserIdentity>,
    pub menu: Vec<MenuItemView>,
    /// Present in the administrative area only
    pub sidebar: Option<Vec<LinkView>>,
}

/// Routed content
#[derive(Debug, Clone, PartialEq)]
pub enum Outlet {
    /// Suspension fallback while the screen loads
    Loading,
    Screen(ScreenOutput),
    /// Failure boundary fallback
    Failed(FallbackCard),
    NotFound { path: String },
}

/// One rendered page
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub navigation: NavigationId,
    pub path: String,
    pub chrome: Chrome,
    pub outlet: Outlet,
}

/// Outcome of a navigation
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub id: NavigationId,
    /// Path that was asked for, normalized
    pub requested: String,
    /// Path that was actually entered
    pub path: String,
    /// Set when the guard redirected away from `requested`
    pub redirected_from: Option<String>,
    pub visit_recorded: bool,
}

#[derive(Debug, Clone)]
enum Target {
    Screen {
        screen: ScreenId,
        pattern: &'static str,
        params: BTreeMap<String, String>,
    },
    NotFound,
}

#[derive(Debug, Clone)]
struct Location {
    id: NavigationId,
    path: String,
    target: Target,
}

/// The mounted application shell
pub struct Shell {
    session: Arc<SessionStore>,
    routes: RouteTable,
    guard: RouteGuard,
    loader: ModuleLoader,
    recorder: VisitRecorder,
    spawner: Arc<dyn Spawner>,
    menu: Mutex<NavigationMenu>,
    boundary: Mutex<FailureBoundary>,
    location: Mutex<Location>,
    next_navigation: AtomicU64,
    listener: Mutex<Option<ListenerId>>,
}

/// Lock ignoring poisoning; every critical section leaves the data consistent
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Shell {
    /// Mount the shell and enter `initial_path`
    pub fn mount(parts: ShellParts, initial_path: &str) -> Arc<Self> {
        let ShellParts {
            session,
            routes,
            registry,
            transport,
            spawner,
            options,
        } = parts;

        let shell = Arc::new(Self {
            guard: RouteGuard::new(options.login_path.clone()),
            loader: ModuleLoader::new(registry, Arc::clone(&spawner)),
            recorder: VisitRecorder::new(
                transport,
                Arc::clone(&spawner),
                options
                    .visits
                    .clone()
                    .excluding([routes.protected_prefix(), options.login_path.as_str()]),
            ),
            boundary: Mutex::new(FailureBoundary::new("App", options.dev_mode)),
            menu: Mutex::new(NavigationMenu::default()),
            location: Mutex::new(Location {
                id: NavigationId(0),
                path: "/".to_string(),
                target: Target::NotFound,
            }),
            next_navigation: AtomicU64::new(1),
            listener: Mutex::new(None),
            session,
            routes,
            spawner,
        });

        let theme = shell.session.apply_theme();

        let weak = Arc::downgrade(&shell);
        let listener = shell.session.on_external_change(move |change| {
            if let Some(shell) = weak.upgrade() {
                shell.on_external_change(change);
            }
        });
        *lock(&shell.listener) = Some(listener);
        shell.session.spawn_external_sync(shell.spawner.as_ref());

        tracing::info!(theme = %theme, dev_mode = options.dev_mode, "Shell mounted");

        shell.navigate(initial_path);
        shell
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn current_path(&self) -> String {
        lock(&self.location).path.clone()
    }

    pub fn current_navigation(&self) -> NavigationId {
        lock(&self.location).id
    }

    pub fn boundary_state(&self) -> BoundaryState {
        lock(&self.boundary).state().clone()
    }

    // ============ Navigation ============

    /// Enter a path: guard, redirect, start the screen load, record the visit.
    ///
    /// Never waits for the screen; see [`settle`](Self::settle).
    pub fn navigate(&self, requested: &str) -> Navigation {
        let requested = normalize_path(requested);
        let mut path = requested.clone();
        let mut redirected_from = None;

        if self.routes.is_protected(&path) {
            let key = self.guard_key(&path);
            let session = self.session.get_session();
            if let GuardDecision::Redirect { to, from } =
                self.guard.evaluate(&key, &path, session.as_ref())
            {
                tracing::info!(from = %from, to = %to, "Protected route needs a session");
                redirected_from = Some(from);
                path = normalize_path(&to);
            }
        }

        let target = match self.routes.resolve(&path) {
            Some(m) => Target::Screen {
                screen: m.entry.screen,
                pattern: m.entry.pattern,
                params: m.params,
            },
            None => Target::NotFound,
        };

        if let Target::Screen { screen, .. } = &target {
            self.loader.request(*screen);
        }

        let id = NavigationId(self.next_navigation.fetch_add(1, Ordering::SeqCst));
        *lock(&self.location) = Location {
            id,
            path: path.clone(),
            target,
        };

        let visit_recorded = self.recorder.on_navigation(id, &path);

        tracing::info!(navigation = %id, path = %path, "Navigated");

        Navigation {
            id,
            requested,
            path,
            redirected_from,
            visit_recorded,
        }
    }

    fn guard_key(&self, path: &str) -> String {
        self.routes
            .resolve(path)
            .map(|m| m.entry.pattern.to_string())
            .unwrap_or_else(|| self.routes.protected_prefix().to_string())
    }

    /// Render the current location without waiting.
    ///
    /// A screen still loading shows [`Outlet::Loading`]; re-rendering never
    /// records another visit.
    pub fn frame(&self) -> Frame {
        let location = lock(&self.location).clone();
        let chrome = self.chrome(&location.path);
        let outlet = self.outlet(&location);

        Frame {
            navigation: location.id,
            path: location.path,
            chrome,
            outlet,
        }
    }

    /// Wait for the current screen to settle and render it.
    ///
    /// Returns `None` if another navigation happened meanwhile; the late
    /// result is not committed anywhere.
    pub async fn settle(&self) -> Option<Frame> {
        let (id, screen) = {
            let location = lock(&self.location);
            let screen = match &location.target {
                Target::Screen { screen, .. } => Some(*screen),
                Target::NotFound => None,
            };
            (location.id, screen)
        };

        if let Some(screen) = screen {
            // Errors surface through the boundary when rendering
            let _ = self.loader.resolve(screen).await;
        }

        if self.current_navigation() != id {
            tracing::debug!(navigation = %id, "Navigation superseded before settling");
            return None;
        }

        Some(self.frame())
    }

    /// The fallback card's retry: drop all cached modules and boundary state
    /// and enter the current path again
    pub fn reload(&self) -> Navigation {
        tracing::info!("Reloading shell");
        self.loader.reset();
        lock(&self.boundary).reset();
        lock(&self.menu).reset();
        self.session.apply_theme();

        let path = self.current_path();
        self.navigate(&path)
    }

    fn chrome(&self, path: &str) -> Chrome {
        Chrome {
            theme: self.session.get_theme(),
            identity: self.session.get_session().map(|s| s.identity),
            menu: lock(&self.menu).view(path),
            sidebar: self
                .routes
                .under_protected_prefix(path)
                .then(|| admin_sidebar(path)),
        }
    }

    fn outlet(&self, location: &Location) -> Outlet {
        let trace = match &location.target {
            Target::Screen {
                screen, pattern, ..
            } => vec![
                "Suspense".to_string(),
                format!("Route({})", pattern),
                format!("Screen({})", screen),
            ],
            Target::NotFound => vec!["Suspense".to_string(), "NotFound".to_string()],
        };

        let mut boundary = lock(&self.boundary);
        boundary
            .catch(&trace, || match &location.target {
                Target::NotFound => Ok(Outlet::NotFound {
                    path: location.path.clone(),
                }),
                Target::Screen { screen, params, .. } => {
                    match SuspenseBoundary.poll(&self.loader, *screen)? {
                        Suspense::Fallback => Ok(Outlet::Loading),
                        Suspense::Ready(module) => {
                            let cx = ScreenContext {
                                path: location.path.clone(),
                                params: params.clone(),
                                identity: self.session.get_session().map(|s| s.identity),
                            };
                            module.render(&cx).map(Outlet::Screen)
                        }
                    }
                }
            })
            .unwrap_or_else(Outlet::Failed)
    }

    // ============ Chrome interaction ============

    pub fn toggle_theme(&self) -> StorageResult<ThemePreference> {
        self.session.toggle_theme()
    }

    pub fn pointer_enter(&self, label: &str) -> Option<MenuState> {
        lock(&self.menu).pointer_enter(label)
    }

    pub fn pointer_leave(&self, label: &str) -> Option<MenuState> {
        lock(&self.menu).pointer_leave(label)
    }

    pub fn menu_state(&self, label: &str) -> Option<MenuState> {
        lock(&self.menu).state(label)
    }

    // ============ Cross-tab ============

    fn on_external_change(&self, change: &StorageChange) {
        match change.key.as_str() {
            THEME_KEY => {
                self.session.apply_theme();
            }
            USER_KEY | TOKEN_KEY => {
                let path = self.current_path();
                if self.routes.is_protected(&path) && self.session.get_session().is_none() {
                    tracing::info!(path = %path, "Session ended in another tab");
                    self.navigate(&path);
                }
            }
            _ => {}
        }
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        if let Some(id) = lock(&self.listener).take() {
            self.session.remove_listener(id);
        }
    }
}

#[cfg(all(test, feature = "native"))]
mod tests {
    use super::*;
    use crate::loader::{source_fn, LoadError, PlaceholderScreen, RenderError, Screen};
    use crate::routing::screens;
    use crate::runtime::TokioSpawner;
    use crate::session::{
        ClassList, Credential, FixedColorScheme, Session, StorageArea, DARK_MARKER,
    };
    use crate::visits::{TransportError, VisitEvent};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::{mpsc, Notify};

    struct ChannelTransport(mpsc::UnboundedSender<VisitEvent>);

    #[async_trait]
    impl VisitTransport for ChannelTransport {
        async fn record_visit(&self, event: &VisitEvent) -> Result<(), TransportError> {
            let _ = self.0.send(event.clone());
            Ok(())
        }
    }

    struct BrokenScreen;

    impl Screen for BrokenScreen {
        fn id(&self) -> ScreenId {
            screens::WEIGHT
        }

        fn render(&self, _cx: &ScreenContext) -> Result<ScreenOutput, RenderError> {
            Err(RenderError::Failed("chart data missing".to_string()))
        }
    }

    struct Harness {
        area: Arc<StorageArea>,
        session: Arc<SessionStore>,
        root: Arc<ClassList>,
        visits: mpsc::UnboundedReceiver<VisitEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let area = StorageArea::in_memory();
            let root = Arc::new(ClassList::new());
            let session = Arc::new(SessionStore::new(
                area.open_tab(),
                FixedColorScheme(None),
                Arc::clone(&root),
            ));
            let (_, visits) = mpsc::unbounded_channel();
            Self {
                area,
                session,
                root,
                visits,
            }
        }

        fn login(&self) {
            self.session
                .set_session(&Session::new(
                    UserIdentity::new(1, "ada"),
                    Credential::new("tok"),
                ))
                .unwrap();
        }

        fn mount(&mut self, registry: ScreenRegistry, path: &str) -> Arc<Shell> {
            let options = ShellOptions {
                dev_mode: true,
                ..ShellOptions::default()
            };
            self.mount_with(RouteTable::standard(), registry, options, path)
        }

        fn mount_with(
            &mut self,
            routes: RouteTable,
            registry: ScreenRegistry,
            options: ShellOptions,
            path: &str,
        ) -> Arc<Shell> {
            let (tx, rx) = mpsc::unbounded_channel();
            self.visits = rx;
            let registry = registry.with_placeholders(routes.screens());
            Shell::mount(
                ShellParts {
                    session: Arc::clone(&self.session),
                    routes,
                    registry,
                    transport: Arc::new(ChannelTransport(tx)),
                    spawner: Arc::new(TokioSpawner),
                    options,
                },
                path,
            )
        }

        async fn next_visit(&mut self) -> String {
            tokio::time::timeout(Duration::from_secs(1), self.visits.recv())
                .await
                .unwrap()
                .unwrap()
                .path
        }

        async fn no_more_visits(&mut self) {
            tokio::task::yield_now().await;
            assert!(self.visits.try_recv().is_err());
        }
    }

    fn counting(id: ScreenId, loads: &Arc<AtomicUsize>) -> impl crate::loader::ScreenSource {
        let loads = Arc::clone(loads);
        source_fn(move || {
            let loads = Arc::clone(&loads);
            async move {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(PlaceholderScreen::new(id, "Counted")) as Arc<dyn Screen>)
            }
        })
    }

    #[tokio::test]
    async fn test_dashboard_without_session_redirects_to_login() {
        let mut h = Harness::new();
        let admin_loads = Arc::new(AtomicUsize::new(0));
        let registry =
            ScreenRegistry::new().register(screens::DASHBOARD, counting(screens::DASHBOARD, &admin_loads));
        let shell = h.mount(registry, "/");
        assert_eq!(h.next_visit().await, "/");

        let nav = shell.navigate("/dashboard");
        assert_eq!(nav.path, "/login");
        assert_eq!(nav.redirected_from.as_deref(), Some("/dashboard"));
        assert!(!nav.visit_recorded);

        let frame = shell.settle().await.unwrap();
        match frame.outlet {
            Outlet::Screen(output) => assert_eq!(output.screen, screens::LOGIN),
            other => panic!("expected login screen, got {:?}", other),
        }
        assert!(frame.chrome.sidebar.is_none());

        // Admin subtree never requested
        assert_eq!(admin_loads.load(Ordering::SeqCst), 0);
        assert!(matches!(
            shell.loader().state(screens::DASHBOARD),
            crate::loader::ModuleLoadState::Unrequested
        ));
        h.no_more_visits().await;
    }

    #[tokio::test]
    async fn test_profile_with_session_renders() {
        let mut h = Harness::new();
        h.login();
        let shell = h.mount(ScreenRegistry::new(), "/profile");

        let frame = shell.settle().await.unwrap();
        assert_eq!(frame.path, "/profile");
        match frame.outlet {
            Outlet::Screen(output) => assert_eq!(output.screen, screens::PROFILE),
            other => panic!("expected profile screen, got {:?}", other),
        }
        assert_eq!(frame.chrome.identity.unwrap().display_name(), "ada");
        assert_eq!(h.next_visit().await, "/profile");
    }

    #[tokio::test]
    async fn test_guard_reevaluates_after_logout() {
        let mut h = Harness::new();
        h.login();
        let shell = h.mount(ScreenRegistry::new(), "/dashboard/posts");
        assert_eq!(shell.current_path(), "/dashboard/posts");
        assert!(shell.frame().chrome.sidebar.is_some());

        shell.navigate("/about");
        h.session.clear_session().unwrap();

        let nav = shell.navigate("/dashboard/posts");
        assert_eq!(nav.path, "/login");
    }

    #[tokio::test]
    async fn test_visits_once_per_navigation() {
        let mut h = Harness::new();
        let shell = h.mount(ScreenRegistry::new(), "/tags");
        assert_eq!(h.next_visit().await, "/tags");

        shell.settle().await.unwrap();
        shell.frame();
        shell.frame();
        h.no_more_visits().await;

        shell.navigate("/tags");
        assert_eq!(h.next_visit().await, "/tags");
        shell.navigate("/login?next=/dashboard");
        h.no_more_visits().await;
    }

    #[tokio::test]
    async fn test_configured_login_path_and_prefix_are_not_recorded() {
        let mut h = Harness::new();
        let routes = RouteTable::new(RouteTable::standard().entries().to_vec(), "/admin");
        let options = ShellOptions {
            login_path: "/signin".to_string(),
            ..ShellOptions::default()
        };
        let shell = h.mount_with(routes, ScreenRegistry::new(), options, "/about");
        assert_eq!(h.next_visit().await, "/about");

        let navigation = shell.navigate("/profile");
        assert_eq!(navigation.path, "/signin");
        assert_eq!(navigation.redirected_from.as_deref(), Some("/profile"));
        assert!(!navigation.visit_recorded);

        let navigation = shell.navigate("/admin/x");
        assert_eq!(navigation.path, "/signin");
        assert!(!navigation.visit_recorded);

        h.login();
        let navigation = shell.navigate("/admin/x");
        assert_eq!(navigation.path, "/admin/x");
        assert!(!navigation.visit_recorded);
        h.no_more_visits().await;

        shell.navigate("/tags");
        assert_eq!(h.next_visit().await, "/tags");
    }

    #[tokio::test]
    async fn test_loading_fallback_then_screen() {
        let mut h = Harness::new();
        let gate = Arc::new(Notify::new());
        let registry = {
            let gate = Arc::clone(&gate);
            ScreenRegistry::new().register(
                screens::POST,
                source_fn(move || {
                    let gate = Arc::clone(&gate);
                    async move {
                        gate.notified().await;
                        Ok(Arc::new(PlaceholderScreen::new(screens::POST, "Post")) as Arc<dyn Screen>)
                    }
                }),
            )
        };
        let shell = h.mount(registry, "/post/7");

        let frame = shell.frame();
        assert_eq!(frame.outlet, Outlet::Loading);
        // Chrome keeps working while suspended
        assert_eq!(shell.pointer_enter("Blog"), Some(MenuState::Open));

        gate.notify_one();
        let frame = shell.settle().await.unwrap();
        match frame.outlet {
            Outlet::Screen(output) => assert_eq!(output.body, "Post at /post/7 (id=7)"),
            other => panic!("expected post screen, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_late_load_is_not_committed() {
        let mut h = Harness::new();
        let gate = Arc::new(Notify::new());
        let registry = {
            let gate = Arc::clone(&gate);
            ScreenRegistry::new().register(
                screens::POST,
                source_fn(move || {
                    let gate = Arc::clone(&gate);
                    async move {
                        gate.notified().await;
                        Ok(Arc::new(PlaceholderScreen::new(screens::POST, "Post")) as Arc<dyn Screen>)
                    }
                }),
            )
        };
        let shell = h.mount(registry, "/post/1");

        let pending = {
            let shell = Arc::clone(&shell);
            tokio::spawn(async move { shell.settle().await })
        };
        tokio::task::yield_now().await;

        shell.navigate("/about");
        gate.notify_one();

        assert!(pending.await.unwrap().is_none());
        match shell.settle().await.unwrap().outlet {
            Outlet::Screen(output) => assert_eq!(output.screen, screens::ABOUT),
            other => panic!("expected about screen, got {:?}", other),
        }
        // Finished in the background all the same
        tokio::time::timeout(Duration::from_secs(1), shell.loader().resolve(screens::POST))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_load_failure_leaves_chrome_interactive() {
        let mut h = Harness::new();
        let registry = ScreenRegistry::new().register(
            screens::ABOUT,
            source_fn(|| async {
                Err::<Arc<dyn Screen>, _>(LoadError::Fetch("chunk 404".to_string()))
            }),
        );
        let shell = h.mount(registry, "/about");

        let frame = shell.settle().await.unwrap();
        let card = match frame.outlet {
            Outlet::Failed(card) => card,
            other => panic!("expected fallback card, got {:?}", other),
        };
        assert!(card.detail.unwrap().contains("chunk 404"));
        assert!(!frame.chrome.menu.is_empty());

        assert_eq!(shell.pointer_enter("Life"), Some(MenuState::Open));
        assert_eq!(shell.pointer_leave("Life"), Some(MenuState::Closed));
        let before = h.root.contains(DARK_MARKER);
        shell.toggle_theme().unwrap();
        assert_ne!(h.root.contains(DARK_MARKER), before);

        assert!(matches!(shell.boundary_state(), BoundaryState::Failed(_)));
    }

    #[tokio::test]
    async fn test_render_failure_and_reload() {
        let mut h = Harness::new();
        let attempts = Arc::new(AtomicUsize::new(0));
        let registry = {
            let attempts = Arc::clone(&attempts);
            ScreenRegistry::new().register(
                screens::WEIGHT,
                source_fn(move || {
                    let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt == 0 {
                            Ok(Arc::new(BrokenScreen) as Arc<dyn Screen>)
                        } else {
                            Ok(Arc::new(PlaceholderScreen::new(screens::WEIGHT, "Weight"))
                                as Arc<dyn Screen>)
                        }
                    }
                }),
            )
        };
        let shell = h.mount(registry, "/weight");

        let frame = shell.settle().await.unwrap();
        assert!(matches!(frame.outlet, Outlet::Failed(_)));

        let nav = shell.reload();
        assert_eq!(nav.path, "/weight");
        assert_eq!(shell.boundary_state(), BoundaryState::Ok);

        let frame = shell.settle().await.unwrap();
        assert!(matches!(frame.outlet, Outlet::Screen(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_path_not_found() {
        let mut h = Harness::new();
        let shell = h.mount(ScreenRegistry::new(), "/nowhere/");

        let frame = shell.settle().await.unwrap();
        assert_eq!(
            frame.outlet,
            Outlet::NotFound {
                path: "/nowhere".to_string()
            }
        );
        assert_eq!(h.next_visit().await, "/nowhere");
    }

    #[tokio::test]
    async fn test_mount_applies_theme() {
        let mut h = Harness::new();
        h.area.open_tab().set(THEME_KEY, "light").unwrap();
        let shell = h.mount(ScreenRegistry::new(), "/");

        assert!(!h.root.contains(DARK_MARKER));
        assert_eq!(shell.frame().chrome.theme, ThemePreference::Light);
    }

    #[tokio::test]
    async fn test_logout_in_other_tab_leaves_protected_page() {
        let mut h = Harness::new();
        h.login();
        let shell = h.mount(ScreenRegistry::new(), "/dashboard");
        assert_eq!(shell.current_path(), "/dashboard");

        let other_tab = SessionStore::new(h.area.open_tab(), FixedColorScheme(None), ClassList::new());
        other_tab.clear_session().unwrap();

        let redirected = tokio::time::timeout(Duration::from_secs(1), async {
            while shell.current_path() != "/login" {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(redirected.is_ok());
    }

    #[tokio::test]
    async fn test_theme_change_in_other_tab_is_applied() {
        let mut h = Harness::new();
        let _shell = h.mount(ScreenRegistry::new(), "/");
        assert!(h.root.contains(DARK_MARKER));

        let other_tab = SessionStore::new(h.area.open_tab(), FixedColorScheme(None), ClassList::new());
        other_tab.set_theme(ThemePreference::Light).unwrap();

        let applied = tokio::time::timeout(Duration::from_secs(1), async {
            while h.root.contains(DARK_MARKER) {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(applied.is_ok());
    }
}
