//! # Authorization HTTP Server
//!
//! Serves the ShopDesk decision API on top of a validated access policy.
//!
//! ## Configuration
//!
//! - `--config` / `AUTHZ_CONFIG` - TOML config file (optional)
//! - `--policy` - policy document, overrides `[policy].path`
//! - `--port` - listen port, overrides `[server].port`
//! - `AUTHZ_HOST`, `AUTHZ_PORT`, `AUTHZ_POLICY_PATH`, `AUTHZ_LOG_LEVEL`
//! - `RUST_LOG` - log filter, takes precedence over the configured level
//!
//! `--check` validates the policy and exits; `--dump-policy` prints the
//! effective policy as a JSON document.

use anyhow::{Context, Result};
use clap::Parser;
use shopdesk_authz::http::{create_router, AppState};
use shopdesk_authz::{AccessEngine, AuthzConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ShopDesk authorization server CLI
#[derive(Parser)]
#[command(name = "authz-server")]
#[command(about = "ShopDesk role/permission decision service")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "AUTHZ_CONFIG")]
    config: Option<PathBuf>,

    /// Policy document (JSON or TOML), overrides the configured path
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Listen port, overrides the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Validate the policy and exit
    #[arg(long)]
    check: bool,

    /// Print the effective policy as JSON and exit
    #[arg(long)]
    dump_policy: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AuthzConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AuthzConfig::default(),
    };
    config.apply_env_overrides()?;

    // Apply CLI overrides
    if let Some(policy) = cli.policy {
        config.policy.path = Some(policy);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    config.validate()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ShopDesk Authorization Server v{}", shopdesk_authz::VERSION);

    let policy = config
        .build_policy()
        .context("Access policy failed validation")?;

    if cli.check {
        info!(
            "Policy OK: {} permissions, {} guarded routes",
            policy.catalog().len(),
            policy.routes().len()
        );
        return Ok(());
    }

    if cli.dump_policy {
        println!("{}", policy.to_document().to_json_pretty()?);
        return Ok(());
    }

    let addr = config.listen_addr()?;
    let state = AppState::new(AccessEngine::new(Arc::new(policy)));
    let app = create_router(state);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server on {}", addr))?;

    if let Err(e) = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("HTTP server error: {}", e);
        return Err(e.into());
    }

    info!("Server shut down gracefully");
    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to register SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }

    info!("Starting graceful shutdown");
}
