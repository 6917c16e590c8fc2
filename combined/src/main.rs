//! library-auth - account registration, email verification and login.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use account_service_lib::MigrateAction as StoreMigrateAction;
use common::Config;

#[derive(Parser)]
#[command(name = "library-auth")]
#[command(about = "Library management authentication service")]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Overrides SERVER_HOST
        #[arg(long, env = "SERVER_HOST")]
        host: Option<String>,
        /// Overrides SERVER_PORT
        #[arg(long, env = "SERVER_PORT")]
        port: Option<u16>,
    },
    /// Run database migrations for the accounts table
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

impl From<MigrateAction> for StoreMigrateAction {
    fn from(action: MigrateAction) -> Self {
        match action {
            MigrateAction::Up => StoreMigrateAction::Up,
            MigrateAction::Down => StoreMigrateAction::Down,
            MigrateAction::Status => StoreMigrateAction::Status,
            MigrateAction::Fresh => StoreMigrateAction::Fresh,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            info!(
                store = ?config.database.backend,
                "Starting library-auth on http://{}",
                config.server.addr()
            );
            gateway_lib::serve(config).await
        }
        Commands::Migrate { action } => {
            account_service_lib::run_migrations(action.into(), &config.database).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
