//! Error Card Component
//!
//! Failure boundary fallback with the reload action.

use folio_shell::loader::{FallbackCard, RetryAction};
use leptos::*;

use crate::state::GlobalState;

/// Fallback card for a failed screen
#[component]
pub fn ErrorCard(card: FallbackCard) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let FallbackCard {
        title,
        message,
        detail,
        action,
    } = card;
    let action_label = match action {
        RetryAction::ReloadApplication => "Reload",
    };

    view! {
        <div class="flex flex-col items-center justify-center min-h-[60vh] text-center">
            <div class="text-6xl mb-4">"⚠️"</div>
            <h1 class="text-3xl font-bold mb-2">{title}</h1>
            <p class="text-gray-500 dark:text-gray-400 mb-6">{message}</p>

            // Development builds only
            {detail.map(|detail| view! {
                <pre class="max-w-2xl w-full text-left text-xs bg-gray-100 dark:bg-gray-800 rounded-lg p-4 mb-6 overflow-x-auto">
                    {detail}
                </pre>
            })}

            <button
                class="px-6 py-3 bg-primary-600 hover:bg-primary-700 text-white rounded-lg font-medium transition-colors"
                on:click=move |_| state.reload()
            >
                {action_label}
            </button>
        </div>
    }
}
