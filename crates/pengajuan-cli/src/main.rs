//! pengajuan - command-line front end for the product submission backend.
//!
//! Signs in, keeps the session on disk, and calls the backend through the
//! core client, which refreshes expired access tokens transparently.

mod app;
mod utils;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use pengajuan_core::{ApiError, Config};

// ============================================================================
// Constants
// ============================================================================

/// Log file name prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "pengajuan.log";

const AFTER_HELP: &str = "\
Environment:
  API_BASE_URL                Backend base URL
  PENGAJUAN_TIMEOUT_SECS      HTTP timeout in seconds
  RUST_LOG                    Log filter (default: warn)";

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "pengajuan")]
#[command(version, about = "Product submission dashboard on the command line", long_about = None)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Commands {
    /// Sign in and save the session
    Login {
        /// Prompted for when omitted
        username: Option<String>,
    },

    /// Sign out and forget the session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show the navigation menu for your role
    Nav,

    /// Product and submission summary
    Home,

    /// Master product catalogue
    #[command(alias = "master")]
    Produk {
        #[command(subcommand)]
        action: CrudAction,
    },

    /// Product submissions
    Pengajuan {
        #[command(subcommand)]
        action: PengajuanAction,
    },

    /// Menu settings
    Menu {
        #[command(subcommand)]
        action: CrudAction,
    },

    /// User accounts
    #[command(alias = "user")]
    Users {
        #[command(subcommand)]
        action: CrudAction,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum CrudAction {
    /// List all records
    List,
    /// Show one record as JSON
    Show { id: String },
    /// Create a record from a JSON body
    Add { json: String },
    /// Replace a record with a JSON body
    Edit { id: String, json: String },
    /// Delete a record
    Delete { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum PengajuanAction {
    /// List submissions
    List,
    /// Show a submission with its items
    Show { id: String },
    /// Submit a new request from a JSON form
    Add { json: String },
    /// Revise a submission from a JSON form
    Edit { id: String, json: String },
    /// Approve a submission
    Approve { id: String },
    /// Reject a submission
    Reject { id: String },
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and, when the cache directory is available, to a daily
/// rotated file there. The returned guard flushes the file writer on drop.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = Config::default()
        .cache_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let command = cli.command;

    let log_guard = init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "pengajuan starting");

    let mut app = App::new()?;
    let result = app.run(command).await;
    if let Err(e) = result {
        let needs_login = e
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::requires_sign_in);
        eprintln!("Error: {}", e);
        if needs_login {
            eprintln!("Run `pengajuan login` to sign in.");
        }
        // Flush the log file before exiting
        drop(log_guard);
        std::process::exit(1);
    }
    Ok(())
}
