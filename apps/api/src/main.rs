mod candidates;
mod client;
mod config;
mod db;
mod errors;
mod models;
mod routes;
mod state;
mod uploads;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::candidates::store::PgCandidateStore;
use crate::client::draft::CandidateDraft;
use crate::client::FormClient;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::routes::build_app;
use crate::state::AppState;
use crate::uploads::UploadStore;

#[derive(Parser, Debug)]
#[command(name = "lti-api", about = "Candidate tracking API and form client", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Submit a candidate draft (JSON file) to a running service
    Submit(SubmitArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// Path to a candidate draft, dates as typed (e.g. "2016-09-01")
    #[arg(long)]
    file: PathBuf,
    /// Base URL of the candidate API
    #[arg(long, default_value = "http://localhost:3010")]
    api_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    {
        Command::Serve(args) => serve(args).await,
        Command::Submit(args) => submit(args).await,
    }
}

fn init_tracing(rust_log: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(args: ServeArgs) -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let mut config = Config::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }

    init_tracing(&config.rust_log);
    info!("Starting LTI API v{}", env!("CARGO_PKG_VERSION"));

    // One pool for the whole process, closed on shutdown
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    let state = AppState {
        store: Arc::new(PgCandidateStore::new(db.clone())),
        uploads: UploadStore::new(config.upload_dir.clone()),
    };
    info!("Uploads directory: {}", config.upload_dir.display());

    let app = build_app(state, config.cors_origin.clone());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("PostgreSQL connection pool closed");
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM (what container runtimes send).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

async fn submit(args: SubmitArgs) -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()));

    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read draft {}", args.file.display()))?;
    let draft: CandidateDraft = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid candidate draft", args.file.display()))?;

    let notification = FormClient::new(args.api_url)?.submit(&draft).await;
    if !notification.is_success() {
        bail!("{}", notification.message());
    }
    info!("{}", notification.message());
    Ok(())
}
