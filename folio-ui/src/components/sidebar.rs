//! Sidebar Component
//!
//! Link list of the administrative area. Renders nothing elsewhere.

use leptos::*;

use super::nav::MenuLink;
use crate::state::GlobalState;

#[component]
pub fn Sidebar() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    move || {
        state.frame.with(|f| f.chrome.sidebar.clone()).map(|links| {
            view! {
                <aside class="w-56 shrink-0 border-r border-gray-200 dark:border-gray-700 py-6 px-3">
                    <ul class="space-y-1">
                        {links
                            .into_iter()
                            .map(|link| view! { <li><MenuLink link=link /></li> })
                            .collect_view()}
                    </ul>
                </aside>
            }
        })
    }
}
