//! Global Application State
//!
//! The shell decides what to render; this module mirrors its current frame
//! into a Leptos signal and forwards user actions back to it.

use folio_shell::{Frame, MenuState, Navigation, Shell};
use leptos::*;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Global application state provided to all components
#[derive(Clone)]
pub struct GlobalState {
    pub shell: Arc<Shell>,
    /// Last rendered frame of the shell
    pub frame: RwSignal<Frame>,
    /// Open dropdowns, tracked apart from the frame so hover only touches
    /// the dropdown itself
    pub menu_open: RwSignal<BTreeSet<&'static str>>,
}

/// Provide global state to the component tree
pub fn provide_global_state(shell: Arc<Shell>) -> GlobalState {
    let frame = create_rw_signal(shell.frame());

    // Runs after the shell's own listener, so a logout elsewhere has already
    // moved it off a protected page
    let weak = Arc::downgrade(&shell);
    shell.session().on_external_change(move |_| {
        if let Some(shell) = weak.upgrade() {
            frame.set(shell.frame());
        }
    });

    let state = GlobalState {
        shell,
        frame,
        menu_open: create_rw_signal(BTreeSet::new()),
    };
    provide_context(state.clone());
    state
}

impl GlobalState {
    /// Re-render the current location
    pub fn refresh(&self) {
        self.frame.set(self.shell.frame());
    }

    /// Enter a path and update the frame once its screen settles
    pub fn navigate(&self, path: &str) -> Navigation {
        let navigation = self.shell.navigate(path);
        self.follow();
        navigation
    }

    /// Fallback card retry
    pub fn reload(&self) {
        let navigation = self.shell.reload();
        self.menu_open.set(BTreeSet::new());
        web_sys::console::log_1(&format!("Reloaded at {}", navigation.path).into());
        self.follow();
    }

    /// Show the loading state now and the settled screen later
    pub fn follow(&self) {
        self.refresh();

        let shell = Arc::clone(&self.shell);
        let frame = self.frame;
        spawn_local(async move {
            if let Some(settled) = shell.settle().await {
                frame.set(settled);
            }
        });
    }

    pub fn toggle_theme(&self) {
        if let Err(e) = self.shell.toggle_theme() {
            web_sys::console::error_1(&format!("Failed to save theme: {}", e).into());
        }
        self.refresh();
    }

    /// Pointer or focus entered a menu entry
    pub fn menu_enter(&self, label: &'static str) {
        let state = self.shell.pointer_enter(label);
        self.set_menu(label, state);
    }

    /// Pointer or focus left a menu entry
    pub fn menu_leave(&self, label: &'static str) {
        let state = self.shell.pointer_leave(label);
        self.set_menu(label, state);
    }

    fn set_menu(&self, label: &'static str, state: Option<MenuState>) {
        let open = match state {
            Some(state) => state == MenuState::Open,
            None => return,
        };
        if self.menu_open.with_untracked(|set| set.contains(label)) != open {
            self.menu_open.update(|set| {
                if open {
                    set.insert(label);
                } else {
                    set.remove(label);
                }
            });
        }
    }
}
