//! Request snapshotting.
//!
//! # Responsibilities
//! - Extract method, URL, headers
//! - Resolve the client IP (host extension, forwarded header, socket)
//! - Read the session id a session layer left behind
//! - Obtain a parsed body without disturbing the handler's copy
//!
//! # Design Decisions
//! - Bodies are buffered only when some emission could render them
//! - Only bodies with a known size within `body_limit` are buffered
//! - A body that fails or outgrows its hint mid-buffer is forwarded as the
//!   bytes read so far followed by the rest of the original stream
//! - JSON and urlencoded forms are parsed; other media types are not logged

use std::net::{IpAddr, SocketAddr};

use axum::body::{Body, Bytes};
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Request};
use futures_util::stream::{self, StreamExt};
use http_body::Body as HttpBody;
use serde_json::{Map, Value};

use crate::logger::{RequestLogger, RequestSnapshot};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Client address resolved by an outer layer (e.g. PROXY protocol).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

/// Session identifier set by a session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

/// Body already parsed by an outer layer. Takes precedence over buffering.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(pub Value);

/// Path and query of the request target.
pub fn request_url<B>(req: &Request<B>) -> String {
    req.uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string())
}

/// Best-effort client IP.
pub fn resolve_ip<B>(req: &Request<B>, trust_proxy: bool) -> Option<String> {
    if let Some(ClientIp(ip)) = req.extensions().get::<ClientIp>() {
        return Some(ip.to_string());
    }

    if trust_proxy {
        let forwarded = req
            .headers()
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

pub fn session_id<B>(req: &Request<B>) -> Option<String> {
    req.extensions().get::<SessionId>().map(|s| s.0.clone())
}

/// Headers as a JSON map. Repeated headers become arrays.
pub fn header_map(headers: &HeaderMap) -> Map<String, Value> {
    let mut map = Map::new();
    for name in headers.keys() {
        let mut values: Vec<Value> = headers
            .get_all(name)
            .iter()
            .map(|v| Value::String(String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let value = if values.len() == 1 {
            values.remove(0)
        } else {
            Value::Array(values)
        };
        map.insert(name.as_str().to_string(), value);
    }
    map
}

/// Whether the media type is one we know how to parse.
fn parseable(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| is_json(ct) || is_form(ct))
}

fn is_json(content_type: &str) -> bool {
    let essence = media_type(content_type);
    essence == "application/json" || essence.ends_with("+json")
}

fn is_form(content_type: &str) -> bool {
    media_type(content_type) == "application/x-www-form-urlencoded"
}

fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Parse a buffered body. Returns `None` for empty, unknown or malformed input.
pub fn parse_body(content_type: Option<&str>, bytes: &[u8]) -> Option<Value> {
    let content_type = content_type?;
    if bytes.is_empty() {
        return None;
    }
    if is_json(content_type) {
        return serde_json::from_slice(bytes).ok();
    }
    if is_form(content_type) {
        let mut map = Map::new();
        for (key, value) in url::form_urlencoded::parse(bytes) {
            let value = Value::String(value.into_owned());
            match map.get_mut(key.as_ref()) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(key.into_owned(), value);
                }
            }
        }
        return Some(Value::Object(map));
    }
    None
}

/// Snapshot a request for `logger`, returning the request to forward.
///
/// When the body is buffered the forwarded request carries the same bytes,
/// and a read error is replayed to the handler after them.
pub async fn capture(req: Request<Body>, logger: &RequestLogger) -> (Request<Body>, RequestSnapshot) {
    let config = logger.config();
    let mut snapshot = RequestSnapshot {
        method: req.method().to_string(),
        url: request_url(&req),
        ip: resolve_ip(&req, config.trust_proxy),
        session_id: session_id(&req),
        headers: header_map(req.headers()),
        body: None,
    };

    if let Some(ParsedBody(body)) = req.extensions().get::<ParsedBody>() {
        snapshot.body = Some(body.clone());
        return (req, snapshot);
    }

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if !logger.wants_body() || !parseable(content_type.as_deref()) {
        return (req, snapshot);
    }

    let (parts, body) = req.into_parts();
    let limit = config.body_limit;
    let within_limit = body
        .size_hint()
        .upper()
        .is_some_and(|len| len <= limit as u64);
    if !within_limit {
        tracing::trace!(url = %snapshot.url, "Request body size unknown or over limit, not captured");
        return (Request::from_parts(parts, body), snapshot);
    }

    let mut frames = body.into_data_stream();
    let mut buffered = Vec::new();
    while let Some(chunk) = frames.next().await {
        match chunk {
            Ok(bytes) => {
                buffered.extend_from_slice(&bytes);
                if buffered.len() > limit {
                    tracing::debug!(url = %snapshot.url, limit, "Request body outgrew its size hint, not captured");
                    let prefix = Bytes::from(buffered);
                    let rest = stream::once(async move { Ok::<_, axum::Error>(prefix) }).chain(frames);
                    return (Request::from_parts(parts, Body::from_stream(rest)), snapshot);
                }
            }
            Err(e) => {
                // The handler sees what arrived, then the same failure.
                tracing::debug!(error = %e, url = %snapshot.url, "Request body could not be buffered");
                let mut replay = Vec::with_capacity(2);
                if !buffered.is_empty() {
                    replay.push(Ok(Bytes::from(buffered)));
                }
                replay.push(Err(e));
                return (Request::from_parts(parts, Body::from_stream(stream::iter(replay))), snapshot);
            }
        }
    }

    let bytes = Bytes::from(buffered);
    snapshot.body = parse_body(content_type.as_deref(), &bytes);
    (Request::from_parts(parts, Body::from(bytes)), snapshot)
}
