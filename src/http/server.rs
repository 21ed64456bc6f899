//! Demo HTTP server.
//!
//! # Responsibilities
//! - Create an Axum Router with a few handlers worth logging
//! - Wrap it in the request logger and a request timeout
//! - Serve with connection info so the socket address is available
//!
//! # Routes
//! - `GET /health`: plain `ok`
//! - `POST /echo`: returns the JSON body it received
//! - `ANY /status/{code}`: responds with the given status code
//!
//! # Design Decisions
//! - The timeout sits inside the logger, so timed-out requests are still
//!   logged with their 408 status
//! - Request body buffering happens in the logger before the timeout starts;
//!   a slow upload delays the handler but not the arrival timestamp

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

use crate::logger::RequestLogger;

/// Default request timeout for the demo router.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP server wrapping the demo router in a request logger.
pub struct HttpServer {
    router: Router,
    logger: RequestLogger,
}

impl HttpServer {
    pub fn new(logger: RequestLogger, request_timeout: Duration) -> Self {
        let router = build_router(&logger, request_timeout);
        Self { router, logger }
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            log_level = %self.logger.config().log_level,
            json_logs = self.logger.config().json_logs,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn logger(&self) -> &RequestLogger {
        &self.logger
    }
}

/// Build the demo router with the logger as the outermost layer.
#[allow(deprecated)]
pub fn build_router(logger: &RequestLogger, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/echo", post(echo))
        .route("/status/{code}", any(status))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(logger.layer())
}

async fn health() -> &'static str {
    "ok"
}

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, status.canonical_reason().unwrap_or_default().to_string()),
        Err(_) => (StatusCode::BAD_REQUEST, format!("invalid status code {}", code)),
    }
}

/// Wait for shutdown signal (Ctrl+C).
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
