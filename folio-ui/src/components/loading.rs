//! Loading Component
//!
//! Suspension fallback shown while a screen loads.

use leptos::*;

/// Full-page loading spinner
#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center py-12" role="status" aria-label="Loading">
            <div class="loading-spinner w-8 h-8" />
        </div>
    }
}
