use crate::dispatcher::{slash_redirect_location, HandlerResponse};
use crate::router::{RouteKind, RouteTable};
use dashmap::DashMap;
use http::{Method, StatusCode};
use may_minihttp::Response;
use once_cell::sync::Lazy;
use serde_json::Value;
use smallvec::SmallVec;
use std::io;
use tracing::warn;

/// Headers `may_minihttp` can hold in one response.
pub const MAX_RESPONSE_HEADERS: usize = 16;

/// Request-dependent header lines kept before new ones stop being interned.
pub const MAX_INTERNED_HEADER_LINES: usize = 1024;

/// Lines longer than this are never interned.
const MAX_INTERNED_LINE_LEN: usize = 1024;

const TEXT_CONTENT_TYPE_LINE: &str = "content-type: text/plain; charset=utf-8";
const JSON_CONTENT_TYPE_LINE: &str = "content-type: application/json";

type HeaderLines = SmallVec<[&'static str; MAX_RESPONSE_HEADERS]>;

/// `may_minihttp` only accepts `&'static str` header lines, so each distinct
/// line is leaked once and reused from here afterwards.
///
/// Lines derived from a route table (`allow` values and slash-redirect
/// locations) are pinned and finite. Everything else shares a bounded pool;
/// once it is full, unseen lines are not written.
pub struct HeaderLineCache {
    pinned: DashMap<String, &'static str>,
    dynamic: DashMap<String, &'static str>,
    capacity: usize,
}

static HEADER_LINES: Lazy<HeaderLineCache> =
    Lazy::new(|| HeaderLineCache::new(MAX_INTERNED_HEADER_LINES));

impl HeaderLineCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let pinned = DashMap::new();
        for line in [TEXT_CONTENT_TYPE_LINE, JSON_CONTENT_TYPE_LINE] {
            pinned.insert(line.to_string(), line);
        }
        Self {
            pinned,
            dynamic: DashMap::new(),
            capacity,
        }
    }

    /// Number of request-dependent lines interned so far.
    #[must_use]
    pub fn dynamic_len(&self) -> usize {
        self.dynamic.len()
    }

    fn get(&self, line: &str) -> Option<&'static str> {
        if let Some(found) = self.pinned.get(line) {
            return Some(*found);
        }
        self.dynamic.get(line).map(|found| *found)
    }

    fn pin(&self, line: String) {
        if self.pinned.contains_key(&line) {
            return;
        }
        self.dynamic.remove(&line);
        let key = line.clone();
        self.pinned
            .entry(key)
            .or_insert_with(|| Box::leak(line.into_boxed_str()));
    }

    /// Pin every line the router itself can emit for `table`.
    pub fn pin_routes(&self, table: &RouteTable) {
        let mut last_path: Option<String> = None;
        for route in table.routes() {
            if route.kind == RouteKind::SlashRedirect {
                let location = slash_redirect_location(&route.path, None);
                self.pin(format!("location: {location}"));
            }
            if last_path.as_deref() != Some(route.path.as_str()) {
                if let Some(allow) = table.allow_header(&route.path) {
                    self.pin(format!("allow: {allow}"));
                }
                last_path = Some(route.path);
            }
        }
    }

    fn intern(&self, name: &str, value: &str) -> Option<&'static str> {
        let line = format!("{name}: {value}");
        if let Some(found) = self.get(&line) {
            return Some(found);
        }
        // Concurrent writers may overshoot the capacity by a few lines.
        if line.len() > MAX_INTERNED_LINE_LEN || self.dynamic.len() >= self.capacity {
            return None;
        }
        let key = line.clone();
        Some(
            *self
                .dynamic
                .entry(key)
                .or_insert_with(|| Box::leak(line.into_boxed_str())),
        )
    }

    /// Interned line for `name: value`. A `location` that cannot be interned
    /// falls back to its target without the query string.
    fn resolve(&self, name: &str, value: &str) -> Option<&'static str> {
        if let Some(line) = self.intern(name, value) {
            return Some(line);
        }
        if name.eq_ignore_ascii_case("location") {
            if let Some((target, _)) = value.split_once('?') {
                return self.intern(name, target);
            }
        }
        None
    }
}

/// Pin the `allow` and `location` lines of `table` in the shared cache so
/// router-generated responses are always written in full.
pub fn pin_route_headers(table: &RouteTable) {
    HEADER_LINES.pin_routes(table);
}

fn status_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

/// Header names and values must not smuggle extra lines into the response.
fn is_writable_header(name: &str, value: &str) -> bool {
    !name.is_empty()
        && !name.bytes().any(|b| b == b':' || b.is_ascii_whitespace() || b.is_ascii_control())
        && !value.bytes().any(|b| b == b'\r' || b == b'\n')
}

/// Serialize a handler response body with its default content-type line.
fn encode_body(body: &Value) -> io::Result<Option<(&'static str, Vec<u8>)>> {
    Ok(match body {
        Value::Null => None,
        Value::String(s) => Some((TEXT_CONTENT_TYPE_LINE, s.clone().into_bytes())),
        other => Some((
            JSON_CONTENT_TYPE_LINE,
            serde_json::to_vec(other).map_err(io::Error::other)?,
        )),
    })
}

/// Header lines to write for `response`, at most [`MAX_RESPONSE_HEADERS`].
///
/// The content type always comes first so it survives the limit; extra
/// headers past the limit are dropped with a warning.
fn header_lines(
    cache: &HeaderLineCache,
    response: &HandlerResponse,
    default_content_type: Option<&'static str>,
) -> HeaderLines {
    let mut lines = HeaderLines::new();
    let mut content_type_written = false;
    let mut dropped: SmallVec<[&str; 4]> = SmallVec::new();

    let writable = response.headers.iter().filter(|(name, value)| {
        if name.eq_ignore_ascii_case("content-length") {
            return false;
        }
        if !is_writable_header(name, value) {
            warn!(header = %name, "Dropping response header with invalid characters");
            return false;
        }
        true
    });

    let content_type = response.headers.iter().find(|(name, value)| {
        name.eq_ignore_ascii_case("content-type") && is_writable_header(name, value)
    });
    if let Some((name, value)) = content_type {
        match cache.resolve(name, value) {
            Some(line) => {
                lines.push(line);
                content_type_written = true;
            }
            None => warn!(header = %name, "Header line cache full; using default content type"),
        }
    }
    if !content_type_written {
        if let Some(line) = default_content_type {
            lines.push(line);
        }
    }

    for (name, value) in writable {
        if name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        if lines.len() == MAX_RESPONSE_HEADERS {
            dropped.push(name.as_ref());
            continue;
        }
        match cache.resolve(name, value) {
            Some(line) => lines.push(line),
            None => warn!(header = %name, "Header line cache full; dropping header"),
        }
    }

    if !dropped.is_empty() {
        warn!(
            limit = MAX_RESPONSE_HEADERS,
            dropped = ?dropped,
            "Response header limit reached; dropping headers"
        );
    }
    lines
}

/// Write `response` into the `may_minihttp` response.
///
/// Bodies are omitted for HEAD requests; `content-length` is always computed
/// by the server.
pub fn write_handler_response(
    res: &mut Response,
    method: &Method,
    response: &HandlerResponse,
) -> io::Result<()> {
    res.status_code(response.status as usize, status_reason(response.status));

    let body = encode_body(&response.body)?;
    let default_content_type = body.as_ref().map(|(line, _)| *line);
    for line in header_lines(&HEADER_LINES, response, default_content_type) {
        res.header(line);
    }

    if let Some((_, bytes)) = body {
        if *method != Method::HEAD {
            res.body_vec(bytes);
        }
    }
    Ok(())
}
