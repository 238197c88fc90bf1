//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::{DEFAULT_API_BASE_URL, DEFAULT_CLIENT_TIMEOUT_SECONDS};

/// Restaurant ordering backend and order watchers
#[derive(Parser, Debug)]
#[command(name = "restaurant-orders")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Poll a running server for order changes
    Watch(WatchArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides SERVER_HOST)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on (overrides SERVER_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the watch command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Server base URL
    #[arg(long, default_value = DEFAULT_API_BASE_URL, env = "API_BASE_URL")]
    pub base_url: String,

    /// Firebase UID to call the API as
    #[arg(short, long, env = "WATCH_USER_ID")]
    pub user_id: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_CLIENT_TIMEOUT_SECONDS)]
    pub timeout: u64,

    #[command(subcommand)]
    pub target: WatchTarget,
}

/// What to watch
#[derive(Subcommand, Debug)]
pub enum WatchTarget {
    /// Staff view: chime on new pending orders (press Enter to mark them seen)
    Admin,
    /// Guest view: follow one order until it is ready
    Order {
        /// Order ID
        id: Uuid,
    },
}
