//! Line rendering: timestamps, text templates, JSON records and colors.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use console::Style;

use crate::config::schema::DEFAULT_TIMESTAMP_FORMAT;
use crate::config::ColorMode;
use crate::logger::level::Severity;
use crate::logger::record::LogRecord;

/// Placeholder for an address that could not be resolved.
const UNKNOWN_IP: &str = "unknown";

/// A validated strftime pattern.
#[derive(Debug, Clone)]
pub struct TimestampFormat {
    pattern: String,
}

impl TimestampFormat {
    /// Falls back to the default pattern when `pattern` does not parse.
    pub fn new(pattern: &str) -> Self {
        let invalid = StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error));
        if invalid {
            tracing::debug!(pattern, "Unparsable timestamp format, using default");
            return Self::default();
        }
        Self {
            pattern: pattern.to_string(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render the current local time.
    pub fn now(&self) -> String {
        let now = Local::now();
        let mut out = String::new();
        if write!(out, "{}", now.format(&self.pattern)).is_ok() {
            return out;
        }
        // Some specifiers can still fail at render time.
        out.clear();
        let _ = write!(out, "{}", now.format(DEFAULT_TIMESTAMP_FORMAT));
        out
    }
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

/// Severity-to-color decoration for text lines.
#[derive(Debug, Clone, Copy)]
pub struct Colorizer {
    mode: ColorMode,
}

impl Colorizer {
    pub fn new(mode: ColorMode) -> Self {
        Self { mode }
    }

    pub fn paint(&self, severity: Severity, text: &str) -> String {
        let style = match severity {
            Severity::Error => Style::new().red(),
            Severity::Warn => Style::new().yellow(),
            Severity::Info => Style::new().green(),
            Severity::Debug => Style::new().cyan(),
        };
        let style = match self.mode {
            ColorMode::Never => return text.to_string(),
            ColorMode::Always => style.force_styling(true),
            ColorMode::Auto => style,
        };
        style.apply_to(text).to_string()
    }
}

fn prefix(record: &LogRecord, severity: Severity) -> String {
    format!("[{}] [{}]", record.timestamp, severity.tag())
}

fn compact_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// `[ts] [INFO] GET /path` with an optional ` - IP: addr` suffix.
pub fn request_line(record: &LogRecord, with_ip: bool) -> String {
    let mut line = format!("{} {} {}", prefix(record, Severity::Info), record.method, record.url);
    if with_ip {
        let ip = record.ip.as_deref().unwrap_or(UNKNOWN_IP);
        let _ = write!(line, " - IP: {}", ip);
    }
    line
}

pub fn headers_line(record: &LogRecord) -> String {
    format!("{} Headers: {}", prefix(record, Severity::Debug), compact_json(&record.headers))
}

pub fn body_line(record: &LogRecord) -> String {
    format!("{} Body: {}", prefix(record, Severity::Debug), compact_json(&record.body))
}

pub fn response_line(record: &LogRecord) -> String {
    format!(
        "{} Response sent with status code {}",
        prefix(record, Severity::Info),
        record.status_code
    )
}

/// Warn or error line for a failing status code.
pub fn status_line(severity: Severity, record: &LogRecord) -> String {
    format!(
        "{} {} {} - Status Code: {}",
        prefix(record, severity),
        record.method,
        record.url,
        record.status_code
    )
}

pub fn failure_line(record: &LogRecord, message: &str) -> String {
    format!(
        "{} {} {} - Error: {}",
        prefix(record, Severity::Error),
        record.method,
        record.url,
        message
    )
}

/// Pretty-printed JSON record.
pub fn json_record(record: &LogRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::record::RequestSnapshot;
    use serde_json::json;

    fn record() -> LogRecord {
        LogRecord::new(
            "2024-05-01T10:00:00.000+00:00".into(),
            RequestSnapshot::new("GET", "/health"),
        )
    }

    #[test]
    fn request_line_with_and_without_ip() {
        let mut r = record();
        assert_eq!(request_line(&r, false), "[2024-05-01T10:00:00.000+00:00] [INFO] GET /health");
        assert_eq!(
            request_line(&r, true),
            "[2024-05-01T10:00:00.000+00:00] [INFO] GET /health - IP: unknown"
        );
        r.ip = Some("10.0.0.7".into());
        assert!(request_line(&r, true).ends_with(" - IP: 10.0.0.7"));
    }

    #[test]
    fn detail_lines() {
        let mut r = record();
        r.headers.insert("accept".into(), json!("*/*"));
        r.body = Some(json!({"name": "x"}));
        r.status_code = 503;

        assert_eq!(
            headers_line(&r),
            r#"[2024-05-01T10:00:00.000+00:00] [DEBUG] Headers: {"accept":"*/*"}"#
        );
        assert_eq!(body_line(&r), r#"[2024-05-01T10:00:00.000+00:00] [DEBUG] Body: {"name":"x"}"#);
        assert!(response_line(&r).ends_with("[INFO] Response sent with status code 503"));
        assert!(status_line(Severity::Warn, &r).ends_with("[WARN] GET /health - Status Code: 503"));
        assert!(status_line(Severity::Error, &r).ends_with("[ERROR] GET /health - Status Code: 503"));
        assert!(failure_line(&r, "socket hang up").ends_with("[ERROR] GET /health - Error: socket hang up"));
    }

    #[test]
    fn json_record_is_pretty() {
        let out = json_record(&record()).unwrap();
        assert!(out.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["url"], "/health");
    }

    #[test]
    fn colors() {
        assert_eq!(Colorizer::new(ColorMode::Never).paint(Severity::Error, "x"), "x");
        let red = Colorizer::new(ColorMode::Always).paint(Severity::Error, "x");
        assert!(red.contains("\u{1b}[31m"));
        let cyan = Colorizer::new(ColorMode::Always).paint(Severity::Debug, "x");
        assert!(cyan.contains("\u{1b}[36m"));
    }

    #[test]
    fn timestamp_default_shape() {
        let ts = TimestampFormat::default().now();
        // 2024-05-01T10:00:00.123+02:00
        assert_eq!(ts.len(), 29, "{ts}");
        assert_eq!(&ts[10..11], "T");
        assert_eq!(&ts[19..20], ".");
    }

    #[test]
    fn invalid_timestamp_format_falls_back() {
        let format = TimestampFormat::new("%Y-%Q");
        assert_eq!(format.pattern(), DEFAULT_TIMESTAMP_FORMAT);

        let custom = TimestampFormat::new("%H:%M");
        assert_eq!(custom.pattern(), "%H:%M");
        assert_eq!(custom.now().len(), 5);
    }
}
