// src/main.rs - spool-scanner server entry point
use clap::Parser;
use spool_scanner::config::{self, Config};
use spool_scanner::web;

#[derive(Debug, Parser)]
#[command(name = "spool-scanner", version, about = "Assign scanned filament spools to OctoPrint printers")]
struct Cli {
    /// TOML configuration file. Without it, configuration is read from the environment.
    #[arg(short, long)]
    config: Option<String>,
    /// Address to listen on.
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    bind: String,
    /// Directory served under /static.
    #[arg(long, default_value = "web/static")]
    static_dir: String,
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .init();

    tracing::info!("Starting spool-scanner {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            config::load_config(path)
        }
        None => {
            tracing::info!("Loading configuration from environment");
            Config::from_env()
        }
    }
    .map_err(|e| {
        tracing::error!("Failed to load config: {}", e);
        Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
    })?;

    tracing::info!("Spoolman: {}", config.spoolman_url);
    for printer in &config.printers {
        tracing::info!("Printer {}: {} ({})", printer.id, printer.name, printer.octoprint_url);
    }

    let app = web::api::create_router(config, &cli.static_dir)?;

    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
