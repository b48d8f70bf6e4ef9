// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process;

use kubedb_auth_relay::{
    api::router,
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    store::InMemoryStore,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Tracing is not up yet; the log format itself comes from config.
            eprintln!("Invalid configuration: {e}");
            process::exit(1);
        }
    };
    init_tracing(config.log_format);

    let addr = config.bind_addr;
    info!(
        environment = ?config.environment,
        appscode_base_url = %config.appscode_base_url,
        relay_enabled = config.appscode_credential.is_some(),
        "Starting KubeDB auth relay"
    );

    let state = match AppState::new(config, InMemoryStore::new()) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build Appscode client");
            process::exit(1);
        }
    };
    let app = router(state);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Failed to bind");
            process::exit(1);
        }
    };

    info!("KubeDB auth relay listening on http://{addr} (docs at /docs)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "HTTP server failed");
        process::exit(1);
    }
}
