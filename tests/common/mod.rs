//! Shared utilities for integration tests.

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use request_logger::config::{ColorMode, LoggerConfig};
use request_logger::http::server::{build_router, DEFAULT_REQUEST_TIMEOUT};
use request_logger::logger::{MemorySink, RequestLogger};

/// Logger config with colors off so lines compare as plain text.
pub fn plain_config() -> LoggerConfig {
    LoggerConfig {
        color: ColorMode::Never,
        ..LoggerConfig::default()
    }
}

/// Build a capturing logger from a tweaked plain config.
pub fn capturing_logger(configure: impl FnOnce(&mut LoggerConfig)) -> (RequestLogger, MemorySink) {
    let mut config = plain_config();
    configure(&mut config);
    let sink = MemorySink::new();
    (RequestLogger::with_sink(config, sink.clone()), sink)
}

/// Demo router wrapped in a capturing logger.
#[allow(dead_code)]
pub fn demo_app(configure: impl FnOnce(&mut LoggerConfig)) -> (Router, MemorySink) {
    let (logger, sink) = capturing_logger(configure);
    (build_router(&logger, DEFAULT_REQUEST_TIMEOUT), sink)
}

/// Send one request through `app` and drain the response body so the
/// finish observer runs.
#[allow(dead_code)]
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body)
}

/// Drop the `[timestamp] ` prefix of a text line.
#[allow(dead_code)]
pub fn strip_timestamp(line: &str) -> String {
    line.split_once("] ")
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_else(|| line.to_string())
}

/// Extract the timestamp of a text line.
#[allow(dead_code)]
pub fn timestamp_of(line: &str) -> String {
    line.trim_start_matches('[')
        .split_once(']')
        .map(|(ts, _)| ts.to_string())
        .unwrap_or_default()
}
