//! HTTP server for the metrics endpoint.

use crate::collector::SubnetsCollector;
use crate::error::ExporterError;
use crate::metrics;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    collector: Arc<SubnetsCollector>,
    landing_page: Arc<str>,
}

fn landing_page(metrics_path: &str) -> String {
    format!(
        r#"<html>
<head><title>phpIPAM Exporter (Version {VERSION})</title></head>
<body>
<h1>phpIPAM Exporter</h1>
<p><a href="{metrics_path}">Metrics</a></p>
<h2>More information:</h2>
<p><a href="https://github.com/tomvil/phpipam_exporter">github.com/tomvil/phpipam_exporter</a></p>
</body>
</html>
"#
    )
}

/// Create the HTTP router.
fn create_router(collector: Arc<SubnetsCollector>, metrics_path: &str) -> Router {
    let state = AppState {
        collector,
        landing_page: landing_page(metrics_path).into(),
    };

    Router::new()
        .route("/", get(landing_handler))
        .route(metrics_path, get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn landing_handler(State(state): State<AppState>) -> Html<String> {
    Html(state.landing_page.to_string())
}

/// Runs one scrape. Collection failures are logged by the collector and only
/// shrink the sample set; the status stays 200.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    let samples = state.collector.collect().await;

    match metrics::render(state.collector.describe(), &samples) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, metrics::content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{}\n", e)).into_response()
        }
    }
}

async fn health_handler() -> Response {
    (StatusCode::OK, "healthy\n").into_response()
}

/// HTTP server configuration.
pub struct HttpServer {
    collector: Arc<SubnetsCollector>,
    listen_addr: SocketAddr,
    metrics_path: String,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(
        collector: Arc<SubnetsCollector>,
        listen_addr: SocketAddr,
        metrics_path: String,
    ) -> Self {
        Self {
            collector,
            listen_addr,
            metrics_path,
        }
    }

    /// Run the HTTP server until the shutdown signal is received.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), ExporterError> {
        let router = create_router(self.collector, &self.metrics_path);

        let listener = tokio::net::TcpListener::bind(self.listen_addr).await?;

        info!(
            addr = %self.listen_addr,
            path = %self.metrics_path,
            "Listening for metrics requests"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while shutdown.changed().await.is_ok() {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}
