//! Per-request log record.

use serde::Serialize;
use serde_json::{Map, Value};

/// Status a response carries before the handler sets one.
pub const INITIAL_STATUS: u16 = 200;

/// What the host knows about a request when it arrives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: String,
    /// Best-effort client address.
    pub ip: Option<String>,
    pub session_id: Option<String>,
    /// Header name to a string, or an array of strings for repeated headers.
    pub headers: Map<String, Value>,
    /// Parsed request body, when the host could provide one.
    pub body: Option<Value>,
}

impl RequestSnapshot {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), Value::String(value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The record every emission for one request is rendered from.
///
/// The timestamp is fixed when the request arrives and is reused for the
/// response-phase lines. The status code is overwritten once the response
/// finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub method: String,
    pub url: String,
    pub ip: Option<String>,
    #[serde(rename = "sessionID")]
    pub session_id: Option<String>,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Map<String, Value>,
    pub body: Option<Value>,
}

impl LogRecord {
    pub fn new(timestamp: String, snapshot: RequestSnapshot) -> Self {
        Self {
            timestamp,
            method: snapshot.method,
            url: snapshot.url,
            ip: snapshot.ip,
            session_id: snapshot.session_id,
            status_code: INITIAL_STATUS,
            headers: snapshot.headers,
            body: snapshot.body,
        }
    }

    /// True when the body has at least one key (objects), element (arrays)
    /// or character (strings). Scalars count as empty.
    pub fn has_body(&self) -> bool {
        match &self.body {
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::String(s)) => !s.is_empty(),
            _ => false,
        }
    }
}
