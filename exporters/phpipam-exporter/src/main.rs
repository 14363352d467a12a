//! phpIPAM Exporter
//!
//! Polls the phpIPAM REST API on every Prometheus scrape and republishes
//! subnet counts per section and mask as gauges:
//! - `phpipam_subnets_ipv4_used` / `phpipam_subnets_ipv4_free`
//! - `phpipam_subnets_ipv6_used` / `phpipam_subnets_ipv6_free`

mod collector;
mod config;
mod error;
mod logging;
mod metrics;
mod server;

use crate::collector::SubnetsCollector;
use crate::config::{Args, ExporterConfig};
use crate::error::ExporterError;
use crate::server::HttpServer;
use clap::Parser;
use phpipam_client::PhpIpamClient;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), ExporterError> {
    let config = ExporterConfig::from_args(Args::parse())?;
    logging::init(&config.log_level, config.log_format)?;

    info!("Starting phpIPAM exporter (Version: {})", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Listen address: {}", config.listen_address);
    info!("  Metrics path: {}", config.metrics_path);
    info!("  phpIPAM API: {}", config.api_address);
    info!("  Auth mode: {}", config.auth_mode);

    let client = PhpIpamClient::connect(
        config.api_address.as_str(),
        &config.api_username,
        &config.api_password,
        config.auth_mode,
    )
    .await
    .inspect_err(|e| {
        error!("Failed to set up the phpIPAM API client: {}", e);
        error!("Please ensure:");
        error!("  1. PHPIPAM_USERNAME / PHPIPAM_PASSWORD are set correctly");
        error!("  2. The API app id is part of --api.address");
        error!("  3. phpIPAM is reachable at {}", config.api_address);
    })?;
    info!("phpIPAM API client ready ({} auth)", client.auth_mode());

    let collector = Arc::new(SubnetsCollector::new(Arc::new(client)));
    let http_server = HttpServer::new(
        collector,
        config.listen_address,
        config.metrics_path.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut http_task = tokio::spawn(http_server.run(shutdown_rx));

    tokio::select! {
        result = &mut http_task => {
            return match result {
                Ok(inner) => inner,
                Err(e) => Err(ExporterError::Io(std::io::Error::other(e))),
            };
        }
        () = shutdown_signal() => {}
    }

    // Receiver lives inside the server task; a send error only means it already exited
    let _ = shutdown_tx.send(true);
    match http_task.await {
        Ok(result) => result?,
        Err(e) => error!("HTTP server task failed: {}", e),
    }

    info!("Exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        () = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
