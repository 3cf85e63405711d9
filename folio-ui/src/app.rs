//! App Root Component
//!
//! Mounts the shell, keeps it and the router in step, and renders the
//! current frame.

use folio_shell::loader::ScreenOutput;
use folio_shell::shell::Outlet as Content;
use folio_shell::normalize_path;
use leptos::*;
use leptos_router::*;

use crate::browser;
use crate::components::{ErrorCard, Loading, Nav, Sidebar};
use crate::state::{provide_global_state, GlobalState};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_global_state(browser::mount_shell());

    view! {
        <Router>
            <Page />
        </Router>
    }
}

/// Chrome around the routed content
#[component]
fn Page() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let location = use_location();
    let navigate = use_navigate();

    // Router -> shell
    let nav_state = state.clone();
    create_effect(move |_| {
        let path = normalize_path(&location.pathname.get());
        if path == nav_state.shell.current_path() {
            // Initial mount, or the shell already moved here itself
            nav_state.follow();
        } else {
            nav_state.navigate(&path);
        }
    });

    // Shell -> router: guard redirects and logouts in other tabs
    let frame = state.frame;
    create_effect(move |_| {
        let shell_path = frame.with(|f| f.path.clone());
        let router_path = normalize_path(&location.pathname.get_untracked());
        if shell_path != router_path {
            navigate(
                &shell_path,
                NavigateOptions {
                    replace: true,
                    ..Default::default()
                },
            );
        }
    });

    view! {
        <div class="min-h-screen bg-gray-50 text-gray-900 dark:bg-gray-900 dark:text-white flex flex-col">
            // Navigation header
            <Nav />

            <div class="flex flex-1">
                // Admin sidebar
                <Sidebar />

                // Main content area
                <main class="flex-1 container mx-auto px-4 py-8">
                    <RoutedContent />
                </main>
            </div>
        </div>
    }
}

/// Loading, screen, fallback card or not-found
#[component]
fn RoutedContent() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    move || match state.frame.with(|f| f.outlet.clone()) {
        Content::Loading => view! { <Loading /> }.into_view(),
        Content::Screen(output) => view! { <ScreenPage output=output /> }.into_view(),
        Content::Failed(card) => view! { <ErrorCard card=card /> }.into_view(),
        Content::NotFound { path } => view! { <NotFound path=path /> }.into_view(),
    }
}

/// A rendered screen
#[component]
fn ScreenPage(output: ScreenOutput) -> impl IntoView {
    document().set_title(&format!("{} · Folio", output.title));

    view! {
        <article data-screen=output.screen.as_str()>
            <h1 class="text-3xl font-bold mb-4">{output.title}</h1>
            <p class="text-gray-500 dark:text-gray-400">{output.body}</p>
        </article>
    }
}

/// 404 Not Found page
#[component]
fn NotFound(path: String) -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center min-h-[60vh] text-center">
            <div class="text-6xl mb-4">"🔍"</div>
            <h1 class="text-3xl font-bold mb-2">"Page Not Found"</h1>
            <p class="text-gray-500 dark:text-gray-400 mb-6">{format!("Nothing lives at {}.", path)}</p>
            <A
                href="/"
                class="px-6 py-3 bg-primary-600 hover:bg-primary-700 text-white rounded-lg font-medium transition-colors"
            >
                "Go Home"
            </A>
        </div>
    }
}
