//! web-ddd server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ axum (trace, timeout, request id, panic guard)
//!                 │
//!                 ▼
//!           Dispatcher ── exact ─▶ parameterised ─▶ subtree ─▶ not found
//!                 │
//!                 ▼
//!           app handlers (user, widgets, account)
//!                 │
//!        ┌────────┼──────────┬─────────────┐
//!        ▼        ▼          ▼             ▼
//!     storage  sessions  templates      forms
//!   (memory /  (cookie +  (handlebars,   (fallback
//!    sqlite)    DashMap)   hot reload)    markup)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use web_ddd::config::{load_config, AppConfig};
use web_ddd::http::HttpServer;
use web_ddd::lifecycle::{build_app, forward_ctrl_c, Shutdown};
use web_ddd::observability::{logging, metrics};
use web_ddd::templates::TemplateWatcher;

#[derive(Parser)]
#[command(name = "web-ddd")]
#[command(about = "Demo web applications on a custom request muxer", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used without it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => load_config(path),
        None => Ok(AppConfig::default()),
    };
    let level = loaded
        .as_ref()
        .map(|config| config.observability.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    logging::init(&level);

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    tracing::info!(
        app = %config.app_name,
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        backend = ?config.database.backend,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (state, dispatcher) = build_app(&config)?;

    let shutdown = Shutdown::new();
    let gc = state.sessions.spawn_gc(shutdown.subscribe());

    let watcher = match (&state.templates, config.templates.watch) {
        (Some(cache), true) => match TemplateWatcher::new(cache.clone()).spawn(shutdown.subscribe()) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "Failed to start template watcher");
                None
            }
        },
        _ => None,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tokio::spawn(forward_ctrl_c(shutdown.clone()));

    let server = HttpServer::new(config, dispatcher);
    server.run(listener, shutdown.subscribe()).await?;

    shutdown.trigger();
    if let Err(e) = gc.await {
        tracing::warn!(error = %e, "Session GC task ended abnormally");
    }
    if let Some(watcher) = watcher {
        if let Err(e) = watcher.await {
            tracing::warn!(error = %e, "Template watcher task ended abnormally");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
