//! Navigation Component
//!
//! Header with the hover menu, theme toggle and user badge. Lives outside
//! the failure boundary and stays usable when a screen fails.

use folio_shell::menu::{LinkView, MenuItemView};
use folio_shell::ThemePreference;
use leptos::*;
use leptos_router::*;

use crate::state::GlobalState;

/// Navigation header component
#[component]
pub fn Nav() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    view! {
        <nav class="bg-white dark:bg-gray-800 border-b border-gray-200 dark:border-gray-700">
            <div class="container mx-auto px-4">
                <div class="flex items-center justify-between h-16">
                    // Logo and brand
                    <A href="/" class="flex items-center space-x-3">
                        <span class="text-xl font-bold">"Folio"</span>
                    </A>

                    // Menu entries
                    <ul class="flex items-center space-x-1">
                        <For
                            each=move || state.frame.with(|f| f.chrome.menu.clone())
                            key=|item| item.key()
                            children=|item| view! { <MenuItem item=item /> }
                        />
                    </ul>

                    <div class="flex items-center space-x-3">
                        <ThemeToggle />
                        <UserBadge />
                    </div>
                </div>
            </div>
        </nav>
    }
}

/// One top-level entry: a link, or a dropdown opened by hover or focus
#[component]
fn MenuItem(item: MenuItemView) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    match item {
        MenuItemView::Link(link) => view! { <li><MenuLink link=link /></li> }.into_view(),
        MenuItemView::Dropdown {
            label,
            icon,
            active,
            items,
            ..
        } => {
            let menu_open = state.menu_open;
            let is_open = move || menu_open.with(|set| set.contains(label));
            let (enter, leave, focus_in, focus_out) =
                (state.clone(), state.clone(), state.clone(), state);
            let button_class = if active {
                "flex items-center space-x-2 px-4 py-2 rounded-lg bg-gray-100 dark:bg-gray-700"
            } else {
                "flex items-center space-x-2 px-4 py-2 rounded-lg hover:bg-gray-100 dark:hover:bg-gray-700"
            };

            view! {
                <li
                    class="relative"
                    on:mouseenter=move |_| enter.menu_enter(label)
                    on:mouseleave=move |_| leave.menu_leave(label)
                    on:focusin=move |_| focus_in.menu_enter(label)
                    on:focusout=move |_| focus_out.menu_leave(label)
                >
                    <button
                        class=button_class
                        aria-haspopup="true"
                        aria-expanded=move || is_open().to_string()
                    >
                        <span class=format!("icon icon-{}", icon) />
                        <span>{label}</span>
                    </button>
                    {move || is_open().then(|| view! {
                        <ul class="absolute left-0 mt-1 w-44 bg-white dark:bg-gray-800 rounded-lg shadow-lg py-1 z-20">
                            {items
                                .clone()
                                .into_iter()
                                .map(|link| view! { <li><MenuLink link=link /></li> })
                                .collect_view()}
                        </ul>
                    })}
                </li>
            }
            .into_view()
        }
    }
}

/// Individual navigation link
#[component]
pub fn MenuLink(link: LinkView) -> impl IntoView {
    let class = if link.active {
        "flex items-center space-x-2 px-4 py-2 rounded-lg bg-gray-100 dark:bg-gray-700"
    } else {
        "flex items-center space-x-2 px-4 py-2 rounded-lg text-gray-600 dark:text-gray-300 hover:bg-gray-100 dark:hover:bg-gray-700"
    };

    view! {
        <A href=link.path class=class>
            <span class=format!("icon icon-{}", link.icon) />
            <span>{link.label}</span>
        </A>
    }
}

/// Dark/light switch
#[component]
fn ThemeToggle() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let frame = state.frame;

    view! {
        <button
            class="px-3 py-2 rounded-lg hover:bg-gray-100 dark:hover:bg-gray-700"
            title="Toggle theme"
            on:click=move |_| state.toggle_theme()
        >
            {move || match frame.with(|f| f.chrome.theme) {
                ThemePreference::Dark => "🌙",
                ThemePreference::Light => "☀️",
            }}
        </button>
    }
}

/// Logged-in user, or the login link
#[component]
fn UserBadge() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    move || match state.frame.with(|f| f.chrome.identity.clone()) {
        Some(identity) => view! {
            <A href="/profile" class="text-sm font-medium">
                {identity.display_name().to_string()}
            </A>
        }
        .into_view(),
        None => view! {
            <A href="/login" class="text-sm text-gray-600 dark:text-gray-300">"Login"</A>
        }
        .into_view(),
    }
}
