//! Request logging core.
//!
//! # Data Flow
//! ```text
//! RequestSnapshot (from the host)
//!     → RequestLogger::begin_at
//!         stamp timestamp, build LogRecord
//!         route filter match      → JSON record (unconditional)
//!         info admitted           → request line
//!         log_headers + debug     → headers line
//!         log_body + body + debug → body line
//!     → ResponseObservers (owned by the response)
//!         finished(status)        → response / warn / error lines
//!         failed(message)         → error line on stderr
//! ```
//!
//! # Design Decisions
//! - The timestamp is rendered once per request and reused by deferred lines
//! - Each emission site checks the single global threshold
//! - Under `json_logs` every site except `failed` emits the JSON record
//! - Nothing here returns an error; failures degrade to text or are dropped

pub mod format;
pub mod level;
pub mod record;
pub mod sink;

use std::sync::Arc;

use crate::config::{LoggerConfig, RouteFilterHandle};
use crate::http::RequestLoggerLayer;
use crate::routing::PathPrefixFilter;

pub use format::{Colorizer, TimestampFormat};
pub use level::{Severity, Threshold};
pub use record::{LogRecord, RequestSnapshot};
pub use sink::{CapturedLine, LogSink, MemorySink, Stream, StdoutSink};

/// Configured request logger. Cheap to clone; all clones share one config.
#[derive(Clone)]
pub struct RequestLogger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    config: LoggerConfig,
    threshold: Threshold,
    timestamps: TimestampFormat,
    colors: Colorizer,
    route_filter: Option<RouteFilterHandle>,
    sink: Arc<dyn LogSink>,
}

impl RequestLogger {
    /// Build a logger writing to stdout/stderr.
    pub fn new(config: LoggerConfig) -> Self {
        Self::with_sink(config, StdoutSink)
    }

    /// Build a logger writing to a custom sink.
    pub fn with_sink<S>(config: LoggerConfig, sink: S) -> Self
    where
        S: LogSink + 'static,
    {
        let threshold = Threshold::parse(&config.log_level);
        if threshold.level().is_none() {
            tracing::debug!(log_level = %config.log_level, "Unrecognized log level, no lines will be emitted");
        }

        let route_filter = config.custom_route_logger.clone().or_else(|| {
            let prefixes = PathPrefixFilter::new(config.json_route_prefixes.iter().cloned());
            (!prefixes.is_empty()).then(|| RouteFilterHandle::new(prefixes))
        });

        let inner = LoggerInner {
            threshold,
            timestamps: TimestampFormat::new(&config.timestamp_format),
            colors: Colorizer::new(config.color),
            route_filter,
            sink: Arc::new(sink),
            config,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.inner.config
    }

    pub fn threshold(&self) -> Threshold {
        self.inner.threshold
    }

    /// Tower layer applying this logger to a service.
    pub fn layer(&self) -> RequestLoggerLayer {
        RequestLoggerLayer::from_logger(self.clone())
    }

    /// Whether any emission site can render the request body, i.e. whether
    /// a host should bother parsing it.
    pub fn wants_body(&self) -> bool {
        let config = &self.inner.config;
        config.log_body || config.json_logs || self.inner.route_filter.is_some()
    }

    /// Render the current time with the configured timestamp format.
    pub fn stamp(&self) -> String {
        self.inner.timestamps.now()
    }

    /// Run the request phase stamped with the current time.
    pub fn begin(&self, snapshot: RequestSnapshot) -> ResponseObservers {
        self.begin_at(self.stamp(), snapshot)
    }

    /// Run the request phase for a request that arrived at `timestamp` and
    /// hand back the deferred observers.
    pub fn begin_at(&self, timestamp: String, snapshot: RequestSnapshot) -> ResponseObservers {
        let inner = &self.inner;
        let record = LogRecord::new(timestamp, snapshot);

        if inner.route_filter.as_ref().is_some_and(|f| f.matches(&record.url)) {
            inner.emit_json(&record);
        }

        inner.emit(Severity::Info, &record, || {
            format::request_line(&record, inner.config.log_ip)
        });

        if inner.config.log_headers {
            inner.emit(Severity::Debug, &record, || format::headers_line(&record));
        }

        if inner.config.log_body && record.has_body() {
            inner.emit(Severity::Debug, &record, || format::body_line(&record));
        }

        ResponseObservers {
            logger: Arc::clone(&self.inner),
            record,
        }
    }
}

impl std::fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLogger")
            .field("config", &self.inner.config)
            .field("threshold", &self.inner.threshold)
            .finish_non_exhaustive()
    }
}

impl LoggerInner {
    /// Emit one site: the JSON record under `json_logs`, the colored text
    /// line otherwise.
    fn emit(&self, severity: Severity, record: &LogRecord, text: impl FnOnce() -> String) {
        if !self.threshold.admits(severity) {
            return;
        }
        if self.config.json_logs {
            match format::json_record(record) {
                Ok(json) => {
                    self.sink.write_line(Stream::Stdout, &json);
                    return;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "JSON record serialization failed, writing text line");
                }
            }
        }
        let line = self.colors.paint(severity, &text());
        self.sink.write_line(Stream::Stdout, &line);
    }

    fn emit_json(&self, record: &LogRecord) {
        match format::json_record(record) {
            Ok(json) => self.sink.write_line(Stream::Stdout, &json),
            Err(e) => tracing::debug!(error = %e, url = %record.url, "Skipping route JSON record"),
        }
    }
}

/// Deferred response-phase emissions for one request.
///
/// Consumed by whichever of [`finished`](Self::finished) or
/// [`failed`](Self::failed) runs first. Dropping it emits nothing.
pub struct ResponseObservers {
    logger: Arc<LoggerInner>,
    record: LogRecord,
}

impl ResponseObservers {
    pub fn record(&self) -> &LogRecord {
        &self.record
    }

    /// The response was fully produced with `status`.
    pub fn finished(mut self, status: u16) {
        self.record.status_code = status;
        let logger = &self.logger;
        let record = &self.record;
        tracing::trace!(method = %record.method, url = %record.url, status, "Response finished");

        if logger.config.log_response_data {
            logger.emit(Severity::Info, record, || format::response_line(record));
        }
        if status >= 400 {
            logger.emit(Severity::Warn, record, || format::status_line(Severity::Warn, record));
        }
        if status >= 500 {
            logger.emit(Severity::Error, record, || format::status_line(Severity::Error, record));
        }
    }

    /// The response stream failed. Always plain text on stderr.
    pub fn failed(self, message: &str) {
        tracing::trace!(method = %self.record.method, url = %self.record.url, message, "Response failed");
        if self.logger.threshold.admits(Severity::Error) {
            let line = format::failure_line(&self.record, message);
            self.logger.sink.write_line(Stream::Stderr, &line);
        }
    }
}

impl std::fmt::Debug for ResponseObservers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseObservers")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorMode;
    use serde_json::{json, Value};

    fn logger(configure: impl FnOnce(&mut LoggerConfig)) -> (RequestLogger, MemorySink) {
        let mut config = LoggerConfig {
            color: ColorMode::Never,
            ..LoggerConfig::default()
        };
        configure(&mut config);
        let sink = MemorySink::new();
        (RequestLogger::with_sink(config, sink.clone()), sink)
    }

    fn health() -> RequestSnapshot {
        RequestSnapshot::new("GET", "/health")
    }

    fn strip_timestamp(line: &str) -> &str {
        line.split_once("] ").map(|(_, rest)| rest).unwrap_or(line)
    }

    #[test]
    fn get_health_200_default_config() {
        let (logger, sink) = logger(|_| {});
        logger.begin(health()).finished(200);

        let lines = sink.stdout();
        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].starts_with('['));
        assert_eq!(strip_timestamp(&lines[0]), "[INFO] GET /health");
        assert!(sink.stderr().is_empty());
    }

    #[test]
    fn warn_threshold_404_only_warn_line() {
        let (logger, sink) = logger(|c| c.log_level = "warn".into());
        logger.begin(health()).finished(404);

        let lines = sink.stdout();
        assert_eq!(lines.len(), 1, "{lines:?}");
        assert_eq!(strip_timestamp(&lines[0]), "[WARN] GET /health - Status Code: 404");
    }

    #[test]
    fn debug_threshold_503_warn_and_error() {
        let (logger, sink) = logger(|c| c.log_level = "debug".into());
        logger.begin(health()).finished(503);

        let lines: Vec<_> = sink.stdout().iter().map(|l| strip_timestamp(l).to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "[INFO] GET /health",
                "[WARN] GET /health - Status Code: 503",
                "[ERROR] GET /health - Status Code: 503",
            ]
        );
    }

    #[test]
    fn response_data_line_adds_third_line_on_500() {
        let (logger, sink) = logger(|c| c.log_response_data = true);
        logger.begin(health()).finished(500);

        let lines: Vec<_> = sink.stdout().iter().map(|l| strip_timestamp(l).to_string()).collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "[INFO] Response sent with status code 500");
        assert_eq!(lines[2], "[WARN] GET /health - Status Code: 500");
        assert_eq!(lines[3], "[ERROR] GET /health - Status Code: 500");
    }

    #[test]
    fn error_threshold_suppresses_warn() {
        let (logger, sink) = logger(|c| c.log_level = "error".into());
        logger.begin(health()).finished(502);

        let lines = sink.stdout();
        assert_eq!(lines.len(), 1);
        assert_eq!(strip_timestamp(&lines[0]), "[ERROR] GET /health - Status Code: 502");
    }

    #[test]
    fn unknown_level_emits_nothing_anywhere() {
        let (logger, sink) = logger(|c| {
            c.log_level = "verbose".into();
            c.log_headers = true;
            c.log_body = true;
            c.log_response_data = true;
        });
        let snapshot = health().with_header("accept", "*/*").with_body(json!({"a": 1}));
        logger.begin(snapshot.clone()).finished(503);
        logger.begin(snapshot).failed("broken pipe");

        assert!(sink.lines().is_empty(), "{:?}", sink.lines());
    }

    #[test]
    fn headers_and_body_at_debug() {
        let (logger, sink) = logger(|c| {
            c.log_level = "debug".into();
            c.log_headers = true;
            c.log_body = true;
        });
        let snapshot = RequestSnapshot::new("POST", "/items")
            .with_header("content-type", "application/json")
            .with_body(json!({"name": "widget"}));
        logger.begin(snapshot).finished(201);

        let lines: Vec<_> = sink.stdout().iter().map(|l| strip_timestamp(l).to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "[INFO] POST /items",
                r#"[DEBUG] Headers: {"content-type":"application/json"}"#,
                r#"[DEBUG] Body: {"name":"widget"}"#,
            ]
        );
    }

    #[test]
    fn details_need_debug_threshold() {
        let (logger, sink) = logger(|c| {
            c.log_headers = true;
            c.log_body = true;
        });
        logger.begin(health().with_body(json!({"a": 1}))).finished(200);
        assert_eq!(sink.stdout().len(), 1);
    }

    #[test]
    fn empty_body_is_not_logged() {
        let (logger, sink) = logger(|c| {
            c.log_level = "debug".into();
            c.log_body = true;
        });
        logger.begin(health().with_body(json!({}))).finished(200);

        let lines = sink.stdout();
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].contains("Body:"));
    }

    #[test]
    fn ip_suffix() {
        let (logger, sink) = logger(|c| c.log_ip = true);
        logger.begin(health().with_ip("192.168.1.9")).finished(200);
        assert_eq!(strip_timestamp(&sink.stdout()[0]), "[INFO] GET /health - IP: 192.168.1.9");
    }

    #[test]
    fn json_logs_use_one_shape_everywhere() {
        let (logger, sink) = logger(|c| {
            c.json_logs = true;
            c.log_level = "debug".into();
            c.log_headers = true;
            c.log_body = true;
            c.log_response_data = true;
        });
        let snapshot = RequestSnapshot::new("PUT", "/items/1")
            .with_session_id("sess-42")
            .with_header("host", "example.com")
            .with_body(json!({"qty": 3}));
        logger.begin(snapshot).finished(503);

        // info, headers, body, response data, warn, error
        let lines = sink.stdout();
        assert_eq!(lines.len(), 6);
        let records: Vec<Value> = lines.iter().map(|l| serde_json::from_str(l).unwrap()).collect();
        let expected_keys = ["body", "headers", "ip", "method", "sessionID", "statusCode", "timestamp", "url"];
        for record in &records {
            let mut keys: Vec<_> = record.as_object().unwrap().keys().map(String::as_str).collect();
            keys.sort_unstable();
            assert_eq!(keys, expected_keys);
            assert_eq!(record["sessionID"], "sess-42");
            assert_eq!(record["timestamp"], records[0]["timestamp"]);
        }
        assert_eq!(records[0]["statusCode"], 200);
        assert_eq!(records[5]["statusCode"], 503);
    }

    #[test]
    fn failure_is_plain_text_on_stderr_even_in_json_mode() {
        let (logger, sink) = logger(|c| c.json_logs = true);
        logger.begin(health()).failed("connection reset");

        assert_eq!(sink.stdout().len(), 1);
        let errors = sink.stderr();
        assert_eq!(errors.len(), 1);
        assert_eq!(strip_timestamp(&errors[0]), "[ERROR] GET /health - Error: connection reset");
    }

    #[test]
    fn route_logger_is_unconditional() {
        let (logger, sink) = logger(|c| {
            c.log_level = "error".into();
            c.custom_route_logger = Some(RouteFilterHandle::new(|url: &str| url.starts_with("/audit")));
        });
        logger.begin(RequestSnapshot::new("GET", "/audit/log")).finished(200);
        logger.begin(health()).finished(200);

        let lines = sink.stdout();
        assert_eq!(lines.len(), 1);
        let record: Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(record["url"], "/audit/log");
    }

    #[test]
    fn route_prefixes_from_config() {
        let (logger, sink) = logger(|c| {
            c.log_level = "error".into();
            c.json_route_prefixes = vec!["/admin".into()];
        });
        assert!(logger.wants_body());
        logger.begin(RequestSnapshot::new("POST", "/admin/users")).finished(200);
        assert_eq!(sink.stdout().len(), 1);
    }

    #[test]
    fn route_logger_plus_json_logs_emits_twice() {
        let (logger, sink) = logger(|c| {
            c.json_logs = true;
            c.json_route_prefixes = vec!["/".into()];
        });
        logger.begin(health()).finished(200);
        assert_eq!(sink.stdout().len(), 2);
    }

    #[test]
    fn deferred_lines_reuse_arrival_timestamp() {
        let (logger, sink) = logger(|c| {
            c.log_response_data = true;
            c.timestamp_format = "%H:%M:%S%.6f".into();
        });
        let observers = logger.begin(health());
        let arrival = observers.record().timestamp.clone();
        std::thread::sleep(std::time::Duration::from_millis(5));
        observers.finished(200);

        for line in sink.stdout() {
            assert!(line.starts_with(&format!("[{arrival}]")), "{line}");
        }
    }

    #[test]
    fn begin_at_uses_the_given_arrival_time() {
        let (logger, sink) = logger(|c| c.log_response_data = true);
        logger
            .begin_at("arrived".into(), health())
            .finished(200);

        let lines = sink.stdout();
        assert_eq!(lines.len(), 2, "{lines:?}");
        for line in &lines {
            assert!(line.starts_with("[arrived] "), "{line}");
        }
    }

    #[test]
    fn wants_body_only_when_renderable() {
        let (plain, _) = logger(|_| {});
        assert!(!plain.wants_body());
        let (body, _) = logger(|c| c.log_body = true);
        assert!(body.wants_body());
        let (json, _) = logger(|c| c.json_logs = true);
        assert!(json.wants_body());
    }

    #[test]
    fn session_context_changes_nothing() {
        let (with, with_sink) = logger(|c| c.session_context = true);
        let (without, without_sink) = logger(|_| {});
        with.begin(health().with_session_id("s")).finished(404);
        without.begin(health().with_session_id("s")).finished(404);

        let strip = |lines: Vec<String>| -> Vec<String> {
            lines.iter().map(|l| strip_timestamp(l).to_string()).collect()
        };
        assert_eq!(strip(with_sink.stdout()), strip(without_sink.stdout()));
    }
}
