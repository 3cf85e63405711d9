//! Folio Site
//!
//! Personal blog and portfolio frontend built with Leptos (WASM).
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. Routing decisions, the session, screen loading and visit
//! recording all live in `folio-shell`; this crate binds them to the browser
//! and renders the shell's frames.

use leptos::*;

mod app;
mod browser;
mod components;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
