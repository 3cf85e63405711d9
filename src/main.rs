//! Folio CLI
//!
//! Command-line driver for the shell core:
//! - Inspect the route table
//! - Navigate a headless shell and print the settled frames
//! - Read and change the persisted theme and session
//! - Generate a config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_shell::config::{generate_default_config, Config, LoggingConfig};
use folio_shell::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Headless driver for the Folio site shell")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage file, overriding the configured one
    #[arg(short, long, global = true)]
    pub storage: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the route table
    Routes,

    /// Navigate through one or more paths and print each frame
    Navigate {
        /// Paths to enter, in order
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Read or change the theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Read or change the login session
    Session {
        #[command(subcommand)]
        action: Option<SessionAction>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the effective theme
    Get,
    /// Persist a theme (dark or light)
    Set { value: ThemePreference },
    /// Switch to the other theme
    Toggle,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Print the current session
    Show,
    /// Store a session, as the login flow would
    Login {
        /// Identity as a JSON object, e.g. '{"id":1,"username":"ada"}'
        #[arg(long)]
        user: String,
        /// Credential
        #[arg(long)]
        token: Option<String>,
    },
    /// Log out
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(storage) = &cli.storage {
        config.storage.path = storage.to_string_lossy().to_string();
    }

    init_logging(&config.logging);

    match cli.command {
        Commands::Routes => print_routes(&route_table(&config)),

        Commands::Navigate { paths } => navigate(&config, &paths).await?,

        Commands::Theme { action } => {
            let store = open_session(&config)?;
            match action.unwrap_or(ThemeAction::Get) {
                ThemeAction::Get => println!("{}", store.get_theme()),
                ThemeAction::Set { value } => {
                    store.set_theme(value)?;
                    println!("{}", value);
                }
                ThemeAction::Toggle => println!("{}", store.toggle_theme()?),
            }
        }

        Commands::Session { action } => {
            let store = open_session(&config)?;
            match action.unwrap_or(SessionAction::Show) {
                SessionAction::Show => match store.get_session() {
                    Some(session) => {
                        println!("User:  {} (id {})", session.identity.display_name(), session.identity.id);
                        println!(
                            "Token: {}",
                            if session.credential.is_some() { "present" } else { "absent" }
                        );
                    }
                    None => println!("Not logged in"),
                },
                SessionAction::Login { user, token } => {
                    let identity =
                        UserIdentity::from_json(&user).context("Invalid --user JSON")?;
                    let session = Session {
                        identity,
                        credential: token.map(Credential::new),
                    };
                    store.set_session(&session)?;
                    println!("Logged in as {}", session.identity.display_name());
                }
                SessionAction::Clear => {
                    store.clear_session()?;
                    println!("Logged out");
                }
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();
            if let Some(path) = output {
                std::fs::write(&path, &config)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            } else {
                println!("{}", config);
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("folio={0},folio_shell={0}", config.level))
    });
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn storage_path(config: &Config) -> PathBuf {
    match config.storage.path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(&config.storage.path)),
        None => PathBuf::from(&config.storage.path),
    }
}

fn open_session(config: &Config) -> anyhow::Result<Arc<SessionStore>> {
    let path = storage_path(config);
    let backend = FileBackend::open(&path)
        .with_context(|| format!("Failed to open storage {:?}", path))?;
    tracing::debug!("Storage file: {:?}", path);

    let area = StorageArea::new(backend);
    Ok(Arc::new(SessionStore::new(
        area.open_tab(),
        FixedColorScheme(config.shell.color_scheme),
        ClassList::new(),
    )))
}

fn route_table(config: &Config) -> RouteTable {
    RouteTable::new(
        RouteTable::standard().entries().to_vec(),
        config.routing.protected_prefix.as_str(),
    )
}

fn print_routes(routes: &RouteTable) {
    println!("{:<24} {:<20} {:<12} PROTECTED", "PATTERN", "SCREEN", "TITLE");
    for entry in routes.entries() {
        println!(
            "{:<24} {:<20} {:<12} {}",
            entry.pattern,
            entry.screen,
            entry.title,
            if routes.is_protected(entry.pattern) { "yes" } else { "no" }
        );
    }
    println!();
    println!("Everything under {} is protected", routes.protected_prefix());
}

async fn navigate(config: &Config, paths: &[String]) -> anyhow::Result<()> {
    let session = open_session(config)?;
    let routes = route_table(config);
    let registry = ScreenRegistry::new().with_placeholders(routes.screens());
    let transport = HttpVisitTransport::new(&config.api.base_url, config.api.request_timeout())
        .context("Failed to build HTTP client")?;

    let shell = Shell::mount(
        ShellParts {
            session,
            routes,
            registry,
            transport: Arc::new(transport),
            spawner: Arc::new(TokioSpawner),
            options: config.shell_options(),
        },
        "/",
    );

    let mut recorded = false;
    for path in paths {
        let navigation = shell.navigate(path);
        recorded |= navigation.visit_recorded;

        if let Some(from) = &navigation.redirected_from {
            println!("{} -> {} (login required)", from, navigation.path);
        }
        match shell.settle().await {
            Some(frame) => print_frame(&frame),
            None => println!("{}: superseded", navigation.path),
        }
    }

    if recorded {
        // Give in-flight visit events a moment before the runtime shuts down
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    Ok(())
}

fn print_frame(frame: &Frame) {
    println!("[{}] {}", frame.navigation, frame.path);

    let user = frame
        .chrome
        .identity
        .as_ref()
        .map(|identity| identity.display_name().to_string())
        .unwrap_or_else(|| "guest".to_string());
    println!("  theme: {}  user: {}", frame.chrome.theme, user);

    let menu: Vec<String> = frame
        .chrome
        .menu
        .iter()
        .map(|item| {
            if item.is_active() {
                format!("*{}", item.label())
            } else {
                item.label().to_string()
            }
        })
        .collect();
    println!("  menu: {}", menu.join(" | "));

    if let Some(sidebar) = &frame.chrome.sidebar {
        let links: Vec<String> = sidebar
            .iter()
            .map(|link| {
                if link.active {
                    format!("*{}", link.label)
                } else {
                    link.label.to_string()
                }
            })
            .collect();
        println!("  sidebar: {}", links.join(" | "));
    }

    match &frame.outlet {
        Outlet::Loading => println!("  loading..."),
        Outlet::Screen(output) => println!("  {}", output.body),
        Outlet::Failed(card) => {
            println!("  {}: {}", card.title, card.message);
            if let Some(detail) = &card.detail {
                println!("  {}", detail);
            }
        }
        Outlet::NotFound { path } => println!("  Not found: {}", path),
    }
}
