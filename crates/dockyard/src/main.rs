use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use dockyard_core::Layout;
use dockyard_http::Dockyard;

mod config;
use crate::config::Config;

/// Read-only docker registry API server for a registry data directory.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Root of the registry data directory, defaults to the current directory.
    data_dir: Option<PathBuf>,

    #[arg(short, long)]
    config_file: Option<PathBuf>,

    #[arg(short, long, env = "DOCKYARD_LISTEN")]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .compact()
        .init();

    // load configuration
    let mut config = Config::load(cli.config_file.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }

    let data_dir = match cli.data_dir.or(config.data_dir) {
        Some(d) => d,
        None => match std::env::current_dir() {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(2);
            }
        },
    };
    tracing::info!("serving registry data from {}", data_dir.display());

    let dockyard = Dockyard::new(Layout::new(data_dir), config.registry)?;
    let router = dockyard.router()?;

    // run HTTP server
    tracing::info!("listening on {}", config.listen);
    axum::Server::bind(&config.listen)
        .serve(router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("unable to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::warn!("unable to listen for SIGTERM: {e}");
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
    tracing::info!("shutting down");
}
