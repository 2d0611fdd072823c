//! Anansys game backend server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum server ──▶ request id / trace / timeout layers
//!                                          │
//!                                          ▼
//!                                   route table (compiled at startup)
//!                                          │
//!                       ┌──────────────────┼─────────────────────┐
//!                       ▼                  ▼                     ▼
//!                 built-in routes    routes/ modules       404 fallback
//!                 /health, /ping           │
//!                                          ▼
//!                                 services (users, sessions,
//!                                 game state manager, narrator)
//!                                          │
//!                                          ▼
//!                                 structured generation client
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::net::TcpListener;

use anansys_backend::config::load_or_default;
use anansys_backend::lifecycle::signals::forward_signals;
use anansys_backend::observability::{logging, metrics};
use anansys_backend::{AppContext, HttpServer, RouteCatalog, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "anansys-backend", version, about = "Anansys game backend server")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the routes directory
    #[arg(long)]
    routes_dir: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = args.routes_dir {
        config.routes.dir = dir;
    }
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "anansys-backend starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes_dir = %config.routes.dir.display(),
        request_timeout_secs = config.timeouts.request_secs,
        model = %config.generation.model,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let ctx = match AppContext::from_config(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialise generation client");
            return ExitCode::FAILURE;
        }
    };

    let server = HttpServer::new(&config, &ctx, &RouteCatalog::builtin());

    let listener = match TcpListener::bind(&config.listener.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %config.listener.bind_address, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    forward_signals(shutdown.clone());

    if let Err(e) = server.run(listener, shutdown.wait()).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
