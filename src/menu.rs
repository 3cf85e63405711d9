//! Navigation Menu
//!
//! Top navigation with hover-opened dropdowns. Each group is its own
//! `Closed`/`Open` machine driven by pointer (or focus) entering and leaving
//! its region. Nothing closes one group when another opens; in pointer use the
//! regions simply never overlap.

use std::collections::HashMap;

/// A plain link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuLink {
    pub label: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
}

impl MenuLink {
    pub const fn new(label: &'static str, path: &'static str, icon: &'static str) -> Self {
        Self { label, path, icon }
    }
}

/// Top-level menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Leaf(MenuLink),
    Group {
        label: &'static str,
        icon: &'static str,
        items: &'static [MenuLink],
    },
}

impl MenuEntry {
    /// Key used for hover events
    pub fn label(&self) -> &'static str {
        match self {
            MenuEntry::Leaf(link) => link.label,
            MenuEntry::Group { label, .. } => *label,
        }
    }

    /// True if the entry (or one of its items) is the current page
    pub fn is_active(&self, path: &str) -> bool {
        match self {
            MenuEntry::Leaf(link) => link.path == path,
            MenuEntry::Group { items, .. } => items.iter().any(|item| item.path == path),
        }
    }
}

/// The site menu
pub const SITE_MENU: &[MenuEntry] = &[
    MenuEntry::Leaf(MenuLink::new("Home", "/", "home")),
    MenuEntry::Group {
        label: "Blog",
        icon: "book",
        items: &[
            MenuLink::new("Categories", "/categories", "folder"),
            MenuLink::new("Tags", "/tags", "tag"),
            MenuLink::new("Columns", "/columns", "columns"),
        ],
    },
    MenuEntry::Leaf(MenuLink::new("Resources", "/resources", "link")),
    MenuEntry::Leaf(MenuLink::new("Projects", "/projects", "code")),
    MenuEntry::Group {
        label: "Life",
        icon: "heart",
        items: &[
            MenuLink::new("Memories", "/memories", "camera"),
            MenuLink::new("Weight", "/weight", "activity"),
        ],
    },
    MenuEntry::Leaf(MenuLink::new("About", "/about", "user")),
];

/// Sidebar links of the administrative area
pub const ADMIN_LINKS: &[MenuLink] = &[
    MenuLink::new("Overview", "/dashboard", "gauge"),
    MenuLink::new("Posts", "/dashboard/posts", "file-text"),
    MenuLink::new("Categories", "/dashboard/categories", "folder"),
    MenuLink::new("Tags", "/dashboard/tags", "tag"),
    MenuLink::new("Columns", "/dashboard/columns", "columns"),
    MenuLink::new("Resources", "/dashboard/resources", "link"),
    MenuLink::new("Projects", "/dashboard/projects", "code"),
    MenuLink::new("Memories", "/dashboard/memories", "camera"),
    MenuLink::new("Weight", "/dashboard/weight", "activity"),
];

/// Dropdown state of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

/// Rendered link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkView {
    pub label: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
    pub active: bool,
}

/// Rendered top-level entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItemView {
    Link(LinkView),
    Dropdown {
        label: &'static str,
        icon: &'static str,
        active: bool,
        open: bool,
        items: Vec<LinkView>,
    },
}

impl MenuItemView {
    pub fn label(&self) -> &'static str {
        match self {
            MenuItemView::Link(link) => link.label,
            MenuItemView::Dropdown { label, .. } => *label,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            MenuItemView::Link(link) => link.active,
            MenuItemView::Dropdown { active, .. } => *active,
        }
    }

    /// Key for keyed rendering. Ignores the open flag, so opening or
    /// closing a dropdown keeps its element.
    pub fn key(&self) -> String {
        match self {
            MenuItemView::Link(link) => format!("{}:{}", link.label, u8::from(link.active)),
            MenuItemView::Dropdown { label, items, .. } => {
                let active: String = items
                    .iter()
                    .map(|link| if link.active { '1' } else { '0' })
                    .collect();
                format!("{}:{}", label, active)
            }
        }
    }
}

fn link_view(link: &MenuLink, path: &str) -> LinkView {
    LinkView {
        label: link.label,
        path: link.path,
        icon: link.icon,
        active: link.path == path,
    }
}

/// Hover state for every group of a menu
#[derive(Debug, Clone)]
pub struct NavigationMenu {
    entries: &'static [MenuEntry],
    open: HashMap<&'static str, MenuState>,
}

impl NavigationMenu {
    pub fn new(entries: &'static [MenuEntry]) -> Self {
        Self {
            entries,
            open: HashMap::new(),
        }
    }

    pub fn entries(&self) -> &'static [MenuEntry] {
        self.entries
    }

    fn group(&self, label: &str) -> Option<&'static str> {
        self.entries.iter().find_map(|entry| match entry {
            MenuEntry::Group { label: l, .. } if *l == label => Some(*l),
            _ => None,
        })
    }

    fn transition(&mut self, label: &str, next: MenuState) -> Option<MenuState> {
        let key = self.group(label)?;
        let previous = self.open.insert(key, next).unwrap_or_default();
        if previous != next {
            tracing::trace!(entry = key, state = ?next, "Menu transition");
        }
        Some(next)
    }

    /// Pointer entered the entry's region. `None` for leaves and unknown keys.
    pub fn pointer_enter(&mut self, label: &str) -> Option<MenuState> {
        self.transition(label, MenuState::Open)
    }

    /// Pointer left the entry's region
    pub fn pointer_leave(&mut self, label: &str) -> Option<MenuState> {
        self.transition(label, MenuState::Closed)
    }

    /// Keyboard focus moved into the entry
    pub fn focus_in(&mut self, label: &str) -> Option<MenuState> {
        self.pointer_enter(label)
    }

    /// Keyboard focus left the entry
    pub fn focus_out(&mut self, label: &str) -> Option<MenuState> {
        self.pointer_leave(label)
    }

    /// State of a group; `None` for leaves, which have no state
    pub fn state(&self, label: &str) -> Option<MenuState> {
        let key = self.group(label)?;
        Some(self.open.get(key).copied().unwrap_or_default())
    }

    pub fn open_count(&self) -> usize {
        self.open.values().filter(|s| **s == MenuState::Open).count()
    }

    /// Close everything
    pub fn reset(&mut self) {
        self.open.clear();
    }

    /// Derived active flag for the entry with `label`
    pub fn is_active(&self, label: &str, path: &str) -> bool {
        self.entries
            .iter()
            .find(|entry| entry.label() == label)
            .map(|entry| entry.is_active(path))
            .unwrap_or(false)
    }

    /// Render the menu for the current path
    pub fn view(&self, path: &str) -> Vec<MenuItemView> {
        self.entries
            .iter()
            .map(|entry| match entry {
                MenuEntry::Leaf(link) => MenuItemView::Link(link_view(link, path)),
                MenuEntry::Group { label, icon, items } => MenuItemView::Dropdown {
                    label: *label,
                    icon: *icon,
                    active: entry.is_active(path),
                    open: self.open.get(label) == Some(&MenuState::Open),
                    items: items.iter().map(|item| link_view(item, path)).collect(),
                },
            })
            .collect()
    }
}

impl Default for NavigationMenu {
    fn default() -> Self {
        Self::new(SITE_MENU)
    }
}

/// Sidebar for the administrative area
pub fn admin_sidebar(path: &str) -> Vec<LinkView> {
    ADMIN_LINKS.iter().map(|link| link_view(link, path)).collect()
}
