//! Route Table
//!
//! Static path pattern → screen mapping, built once at startup.
//!
//! Patterns are `/`-separated segments where `:name` captures one segment and
//! a trailing `*` captures the rest (possibly nothing). The first matching
//! entry wins, so more specific entries go first.

use std::collections::BTreeMap;

use crate::loader::ScreenId;

/// Screen identifiers of the site
pub mod screens {
    use crate::loader::ScreenId;

    pub const HOME: ScreenId = ScreenId::new("home");
    pub const POST: ScreenId = ScreenId::new("post");
    pub const CATEGORIES: ScreenId = ScreenId::new("categories");
    pub const TAGS: ScreenId = ScreenId::new("tags");
    pub const COLUMNS: ScreenId = ScreenId::new("columns");
    pub const COLUMN: ScreenId = ScreenId::new("column");
    pub const RESOURCES: ScreenId = ScreenId::new("resources");
    pub const PROJECTS: ScreenId = ScreenId::new("projects");
    pub const MEMORIES: ScreenId = ScreenId::new("memories");
    pub const WEIGHT: ScreenId = ScreenId::new("weight");
    pub const ABOUT: ScreenId = ScreenId::new("about");
    pub const PROFILE: ScreenId = ScreenId::new("profile");
    pub const LOGIN: ScreenId = ScreenId::new("login");
    pub const REGISTER: ScreenId = ScreenId::new("register");

    pub const DASHBOARD: ScreenId = ScreenId::new("dashboard");
    pub const ADMIN_POSTS: ScreenId = ScreenId::new("admin-posts");
    pub const ADMIN_POST_EDITOR: ScreenId = ScreenId::new("admin-post-editor");
    pub const ADMIN_CATEGORIES: ScreenId = ScreenId::new("admin-categories");
    pub const ADMIN_TAGS: ScreenId = ScreenId::new("admin-tags");
    pub const ADMIN_COLUMNS: ScreenId = ScreenId::new("admin-columns");
    pub const ADMIN_RESOURCES: ScreenId = ScreenId::new("admin-resources");
    pub const ADMIN_PROJECTS: ScreenId = ScreenId::new("admin-projects");
    pub const ADMIN_MEMORIES: ScreenId = ScreenId::new("admin-memories");
    pub const ADMIN_WEIGHT: ScreenId = ScreenId::new("admin-weight");
    pub const ADMIN_NOT_FOUND: ScreenId = ScreenId::new("admin-not-found");
}

/// Default prefix of the administrative area
pub const DEFAULT_PROTECTED_PREFIX: &str = "/dashboard";

/// One row of the route table
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    pub pattern: &'static str,
    pub screen: ScreenId,
    pub title: &'static str,
    pub protected: bool,
}

impl RouteEntry {
    pub const fn public(pattern: &'static str, screen: ScreenId, title: &'static str) -> Self {
        Self {
            pattern,
            screen,
            title,
            protected: false,
        }
    }

    pub const fn protected(pattern: &'static str, screen: ScreenId, title: &'static str) -> Self {
        Self {
            pattern,
            screen,
            title,
            protected: true,
        }
    }

    /// Match a normalized path, returning captured parameters
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let mut params = BTreeMap::new();
        let mut path_segments = segments(path);

        for pattern_segment in segments(self.pattern) {
            if pattern_segment == "*" {
                let rest: Vec<&str> = path_segments.collect();
                params.insert("*".to_string(), rest.join("/"));
                return Some(params);
            }

            let segment = path_segments.next()?;
            if let Some(name) = pattern_segment.strip_prefix(':') {
                params.insert(name.to_string(), segment.to_string());
            } else if pattern_segment != segment {
                return None;
            }
        }

        match path_segments.next() {
            Some(_) => None,
            None => Some(params),
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A resolved route
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: BTreeMap<String, String>,
}

/// Immutable route table
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    protected_prefix: String,
}

impl RouteTable {
    pub fn new(entries: Vec<RouteEntry>, protected_prefix: impl Into<String>) -> Self {
        Self {
            entries,
            protected_prefix: normalize_path(&protected_prefix.into()),
        }
    }

    /// The site's routes
    pub fn standard() -> Self {
        use screens::*;

        Self::new(
            vec![
                RouteEntry::public("/", HOME, "Home"),
                RouteEntry::public("/post/:id", POST, "Post"),
                RouteEntry::public("/categories", CATEGORIES, "Categories"),
                RouteEntry::public("/tags", TAGS, "Tags"),
                RouteEntry::public("/columns", COLUMNS, "Columns"),
                RouteEntry::public("/columns/:id", COLUMN, "Column"),
                RouteEntry::public("/resources", RESOURCES, "Resources"),
                RouteEntry::public("/projects", PROJECTS, "Projects"),
                RouteEntry::public("/memories", MEMORIES, "Memories"),
                RouteEntry::public("/weight", WEIGHT, "Weight"),
                RouteEntry::public("/about", ABOUT, "About"),
                RouteEntry::protected("/profile", PROFILE, "Profile"),
                RouteEntry::public("/login", LOGIN, "Login"),
                RouteEntry::public("/register", REGISTER, "Register"),
                RouteEntry::protected("/dashboard", DASHBOARD, "Dashboard"),
                RouteEntry::protected("/dashboard/posts", ADMIN_POSTS, "Posts"),
                RouteEntry::protected("/dashboard/posts/:id", ADMIN_POST_EDITOR, "Edit Post"),
                RouteEntry::protected("/dashboard/categories", ADMIN_CATEGORIES, "Categories"),
                RouteEntry::protected("/dashboard/tags", ADMIN_TAGS, "Tags"),
                RouteEntry::protected("/dashboard/columns", ADMIN_COLUMNS, "Columns"),
                RouteEntry::protected("/dashboard/resources", ADMIN_RESOURCES, "Resources"),
                RouteEntry::protected("/dashboard/projects", ADMIN_PROJECTS, "Projects"),
                RouteEntry::protected("/dashboard/memories", ADMIN_MEMORIES, "Memories"),
                RouteEntry::protected("/dashboard/weight", ADMIN_WEIGHT, "Weight"),
                RouteEntry::protected("/dashboard/*", ADMIN_NOT_FOUND, "Not Found"),
            ],
            DEFAULT_PROTECTED_PREFIX,
        )
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn protected_prefix(&self) -> &str {
        &self.protected_prefix
    }

    /// First entry matching the (normalized) path
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.entries.iter().find_map(|entry| {
            entry
                .matches(path)
                .map(|params| RouteMatch { entry, params })
        })
    }

    /// Whether the path sits in the administrative area
    pub fn under_protected_prefix(&self, path: &str) -> bool {
        is_under(path, &self.protected_prefix)
    }

    /// Whether entering the path needs a session
    pub fn is_protected(&self, path: &str) -> bool {
        self.under_protected_prefix(path)
            || self
                .resolve(path)
                .map(|m| m.entry.protected)
                .unwrap_or(false)
    }

    /// Distinct screens with a display title, for registries
    pub fn screens(&self) -> Vec<(ScreenId, &'static str)> {
        let mut seen = Vec::new();
        for entry in &self.entries {
            if !seen.iter().any(|(id, _)| *id == entry.screen) {
                seen.push((entry.screen, entry.title));
            }
        }
        seen
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Segment-aware prefix check: `/dashboard` covers `/dashboard/x` but not
/// `/dashboards`
fn is_under(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .map(|rest| rest.starts_with('/'))
            .unwrap_or(false)
}

/// Canonical form of a requested path: no query or fragment, a single
/// leading slash, no empty segments, no trailing slash
pub fn normalize_path(raw: &str) -> String {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let parts: Vec<&str> = segments(&raw[..end]).collect();
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::screens::*;
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("about"), "/about");
        assert_eq!(normalize_path("/about/"), "/about");
        assert_eq!(normalize_path("//post//7"), "/post/7");
        assert_eq!(normalize_path("/tags?page=2#top"), "/tags");
    }

    #[test]
    fn test_param_capture() {
        let table = RouteTable::standard();
        let m = table.resolve("/post/42").unwrap();
        assert_eq!(m.entry.screen, POST);
        assert_eq!(m.params.get("id").map(String::as_str), Some("42"));

        let m = table.resolve("/columns/rust").unwrap();
        assert_eq!(m.entry.screen, COLUMN);

        assert!(table.resolve("/post").is_none());
        assert!(table.resolve("/post/1/comments").is_none());
    }

    #[test]
    fn test_specific_admin_routes_win_over_wildcard() {
        let table = RouteTable::standard();
        assert_eq!(table.resolve("/dashboard").unwrap().entry.screen, DASHBOARD);
        assert_eq!(
            table.resolve("/dashboard/posts/9").unwrap().entry.screen,
            ADMIN_POST_EDITOR
        );

        let m = table.resolve("/dashboard/settings/advanced").unwrap();
        assert_eq!(m.entry.screen, ADMIN_NOT_FOUND);
        assert_eq!(m.params.get("*").map(String::as_str), Some("settings/advanced"));
    }

    #[test]
    fn test_protection_matches_navigation_surface() {
        let table = RouteTable::standard();
        for path in [
            "/", "/post/1", "/categories", "/tags", "/columns", "/columns/2", "/resources",
            "/projects", "/memories", "/weight", "/about", "/login", "/register",
        ] {
            assert!(!table.is_protected(path), "{} should be public", path);
        }
        for path in ["/profile", "/dashboard", "/dashboard/posts", "/dashboard/anything/at/all"] {
            assert!(table.is_protected(path), "{} should be protected", path);
        }

        // Prefix is segment-aware
        assert!(!table.under_protected_prefix("/dashboards"));
        assert!(table.resolve("/dashboards").is_none());
    }

    #[test]
    fn test_unknown_path() {
        let table = RouteTable::standard();
        assert!(table.resolve("/nope").is_none());
        assert!(!table.is_protected("/nope"));
    }

    #[test]
    fn test_screens_are_distinct() {
        let table = RouteTable::standard();
        let screens = table.screens();
        assert_eq!(screens.len(), table.entries().len());
        assert!(screens.contains(&(PROFILE, "Profile")));
    }
}
