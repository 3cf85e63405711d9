//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::routing::{DEFAULT_LOGIN_PATH, DEFAULT_PROTECTED_PREFIX};
use crate::session::ThemePreference;
use crate::shell::ShellOptions;
use crate::visits::VisitConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub visits: VisitsConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub shell: ShellConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Persisted key-value storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON file standing in for the browser's origin storage
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String {
    data_local_dir()
        .map(|p| p.join("folio").join("storage.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./folio_storage.json".to_string())
}

#[cfg(feature = "native")]
fn data_local_dir() -> Option<PathBuf> {
    dirs::data_local_dir()
}

#[cfg(not(feature = "native"))]
fn data_local_dir() -> Option<PathBuf> {
    None
}

#[cfg(feature = "native")]
fn config_dir() -> Option<PathBuf> {
    dirs::config_dir()
}

#[cfg(not(feature = "native"))]
fn config_dir() -> Option<PathBuf> {
    None
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Blog API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// No timeout unless set
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

/// Visit recorder configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VisitsConfig {
    #[serde(default = "default_visits_enabled")]
    pub enabled: bool,

    /// Extra prefixes on top of the login path and protected prefix,
    /// which are always excluded
    #[serde(default)]
    pub excluded_prefixes: Vec<String>,
}

fn default_visits_enabled() -> bool {
    true
}

impl Default for VisitsConfig {
    fn default() -> Self {
        Self {
            enabled: default_visits_enabled(),
            excluded_prefixes: Vec::new(),
        }
    }
}

/// Route guard configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_protected_prefix")]
    pub protected_prefix: String,
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_protected_prefix() -> String {
    DEFAULT_PROTECTED_PREFIX.to_string()
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            protected_prefix: default_protected_prefix(),
        }
    }
}

/// Shell configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShellConfig {
    /// Show error detail on the fallback card
    #[serde(default)]
    pub dev_mode: bool,

    /// Environment color scheme for the native probe
    #[serde(default)]
    pub color_scheme: Option<ThemePreference>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            config_dir().map(|p| p.join("folio").join("config.toml")),
            Some(PathBuf::from("./folio.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("FOLIO_STORAGE_PATH") {
            self.storage.path = path;
        }

        if let Some(base_url) = var("FOLIO_API_BASE") {
            self.api.base_url = base_url;
        }

        if let Some(enabled) = var("FOLIO_VISITS_ENABLED").and_then(|v| parse_flag(&v)) {
            self.visits.enabled = enabled;
        }

        if let Some(dev_mode) = var("FOLIO_DEV_MODE").and_then(|v| parse_flag(&v)) {
            self.shell.dev_mode = dev_mode;
        }
        if let Some(scheme) = var("FOLIO_COLOR_SCHEME") {
            match scheme.parse() {
                Ok(theme) => self.shell.color_scheme = Some(theme),
                Err(_) => tracing::warn!("Ignoring FOLIO_COLOR_SCHEME={:?}", scheme),
            }
        }

        if let Some(level) = var("FOLIO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("FOLIO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Shell options derived from this config
    pub fn shell_options(&self) -> ShellOptions {
        ShellOptions {
            dev_mode: self.shell.dev_mode,
            login_path: self.routing.login_path.clone(),
            visits: VisitConfig {
                enabled: self.visits.enabled,
                excluded_prefixes: self.visits.excluded_prefixes.clone(),
            },
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Folio Configuration
#
# Environment variables override these settings:
# - FOLIO_STORAGE_PATH
# - FOLIO_API_BASE
# - FOLIO_VISITS_ENABLED
# - FOLIO_DEV_MODE
# - FOLIO_COLOR_SCHEME
# - FOLIO_LOG_LEVEL
# - FOLIO_LOG_FORMAT

[storage]
# JSON file holding the persisted theme and session
path = "~/.local/share/folio/storage.json"

[api]
# Blog API root
base_url = "http://localhost:8080/api"

# Request timeout in seconds (no timeout when unset)
# request_timeout_secs = 10

[visits]
# Record page views
enabled = true

# Extra path prefixes never recorded. The login path and the protected
# prefix below are always excluded.
excluded_prefixes = []

[routing]
# Where unauthenticated visitors of protected pages are sent
login_path = "/login"

# Everything under this prefix needs a session
protected_prefix = "/dashboard"

[shell]
# Show error detail on the fallback card
dev_mode = false

# Environment color scheme: "dark" or "light" (unset means no preference)
# color_scheme = "light"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
