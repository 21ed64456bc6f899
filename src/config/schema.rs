//! Configuration schema definitions.
//!
//! This module defines the complete option surface of the request logger.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::routing::RouteFilter;

/// Default timestamp format: ISO-8601 with milliseconds and UTC offset.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Default maximum request body buffered for logging (1 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Root configuration for the request logger.
///
/// Every option has a default, so an empty TOML document is a valid config.
/// Values are never rejected: an unknown `log_level` or an unparsable
/// `timestamp_format` degrades silently when the logger is constructed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Dump request headers at debug level.
    pub log_headers: bool,

    /// Dump the request body at debug level (non-empty bodies only).
    pub log_body: bool,

    /// Minimum severity threshold (`error`, `warn`, `info` or `debug`).
    pub log_level: String,

    /// chrono strftime format used for the per-request timestamp.
    pub timestamp_format: String,

    /// Append the client IP to the request info line.
    pub log_ip: bool,

    /// Emit an info line when the response finishes.
    pub log_response_data: bool,

    /// Emit the pretty-printed JSON record instead of text lines.
    pub json_logs: bool,

    /// Accepted for compatibility; not consulted by any emission site.
    pub session_context: bool,

    /// Path prefixes that trigger an unconditional JSON record.
    /// Ignored when `custom_route_logger` is set.
    pub json_route_prefixes: Vec<String>,

    /// Terminal color decoration for text lines.
    pub color: ColorMode,

    /// Resolve the client IP from `X-Forwarded-For` before the socket address.
    pub trust_proxy: bool,

    /// Largest request body (bytes) buffered for logging.
    pub body_limit: usize,

    /// Route predicate enabling an unconditional JSON record per matching URL.
    #[serde(skip)]
    pub custom_route_logger: Option<RouteFilterHandle>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_headers: false,
            log_body: false,
            log_level: "info".to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            log_ip: false,
            log_response_data: false,
            json_logs: false,
            session_context: false,
            json_route_prefixes: Vec::new(),
            color: ColorMode::Auto,
            trust_proxy: false,
            body_limit: DEFAULT_BODY_LIMIT,
            custom_route_logger: None,
        }
    }
}

impl LoggerConfig {
    /// Set a programmatic route predicate.
    pub fn with_route_logger<F>(mut self, filter: F) -> Self
    where
        F: RouteFilter + 'static,
    {
        self.custom_route_logger = Some(RouteFilterHandle::new(filter));
        self
    }
}

/// When to decorate text lines with ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color only when the output stream is a terminal.
    #[default]
    Auto,
    /// Always emit ANSI escapes.
    Always,
    /// Never decorate.
    Never,
}

/// Shared, clonable handle to a route predicate.
#[derive(Clone)]
pub struct RouteFilterHandle(Arc<dyn RouteFilter>);

impl RouteFilterHandle {
    pub fn new<F>(filter: F) -> Self
    where
        F: RouteFilter + 'static,
    {
        Self(Arc::new(filter))
    }

    pub fn matches(&self, url: &str) -> bool {
        self.0.matches(url)
    }
}

impl fmt::Debug for RouteFilterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RouteFilterHandle").field(&"<filter>").finish()
    }
}
