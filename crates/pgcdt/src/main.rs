mod app;
mod config;
mod handlers;
mod mock_data;
mod state;
mod storage;

use anyhow::{bail, Context, Result};
use clap::Parser;
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    app::create_app,
    config::{Config, LogFormat, StorageBackend},
    state::AppState,
    storage::PostgresRepository,
};

/// pgcdt - PostgreSQL custom data types and JSONB, side by side
#[derive(Parser, Debug)]
#[command(name = "pgcdt")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,

    /// Create the address type and the users/contacts tables before serving
    #[arg(long)]
    provision: bool,

    /// Drop and re-create the schema before serving (implies --provision)
    #[arg(long)]
    reset: bool,

    /// Create the pin-code and phone-number indexes
    #[arg(long)]
    indexes: bool,

    /// Insert the sample users and contacts
    #[arg(long)]
    seed: bool,
}

impl Cli {
    fn touches_schema(&self) -> bool {
        self.provision || self.reset || self.indexes
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    prepare_schema(&cli, &config).await?;

    let state = AppState::new(&config)?;

    if cli.seed {
        mock_data::seed(&state).await?;
    }

    // Build the application router
    let app = create_app(state, config.request_timeout());

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pgcdt=debug,tower_http=debug".into());

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Runs the schema flags against the configured database.
async fn prepare_schema(cli: &Cli, config: &Config) -> Result<()> {
    if !cli.touches_schema() {
        return Ok(());
    }

    if config.storage_backend != StorageBackend::Postgres {
        bail!("--provision, --reset and --indexes require STORAGE_BACKEND=postgres");
    }

    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not set")?;
    let repo = PostgresRepository::new(url)?;

    if cli.reset {
        repo.teardown().await?;
    }
    if cli.provision || cli.reset {
        repo.provision().await?;
    }
    if cli.indexes {
        repo.create_indexes().await?;
    }

    Ok(())
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["pgcdt", "--port", "8080", "--reset", "--seed"]).unwrap();

        assert_eq!(cli.port, 8080);
        assert!(cli.reset);
        assert!(cli.seed);
        assert!(cli.touches_schema());
    }

    #[tokio::test]
    async fn test_schema_flags_require_postgres() {
        let cli = Cli::try_parse_from(["pgcdt", "--provision"]).unwrap();

        let result = prepare_schema(&cli, &Config::default()).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_no_schema_flags_is_noop() {
        let cli = Cli::try_parse_from(["pgcdt", "--seed"]).unwrap();

        assert!(prepare_schema(&cli, &Config::default()).await.is_ok());
    }
}
