//! Dispatcher core module - hot path for request resolution.
//!
//! Every request walks the same fixed chain: method override, exact lookup,
//! method-not-allowed, not-found. Nothing here blocks or allocates beyond the
//! response itself, so the dispatcher can be shared read-only across every
//! connection coroutine.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use crate::config::RouterConfig;
use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::router::{AllowedMethods, Route, RouteInfo, RouteTable};
use bytes::Bytes;
use futures::{executor, future, stream};
use http::{Method, StatusCode};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::redirect::slash_redirect;

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Maximum inline query/form parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated header storage. Names are lower-cased `Arc<str>`.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Stack-allocated query/form parameter storage, in arrival order.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Form field that lets an HTML form (GET/POST only) ask for another method.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// Content type whose body is parsed into [`HandlerRequest::form_params`].
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Multipart content type whose text fields are parsed into
/// [`HandlerRequest::form_params`].
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Request data handed to a [`Handler`].
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// Method exactly as received, before any form override
    pub method: Method,
    /// Percent-decoded request path without the query string
    pub path: String,
    /// Raw query string (without the leading `?`), if any
    pub query: Option<String>,
    /// HTTP headers (lower-cased names)
    pub headers: HeaderVec,
    /// Decoded query string parameters
    pub query_params: ParamVec,
    /// Decoded urlencoded body parameters (POST, PUT and PATCH only)
    pub form_params: ParamVec,
    /// Raw request body
    pub body: Vec<u8>,
}

impl HandlerRequest {
    /// Build a request for `target`, an origin-form request target such as
    /// `/items?page=2`. The path is percent-decoded; the query is kept raw.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        Self {
            request_id: RequestId::new(),
            method,
            path: percent_decode_str(path).decode_utf8_lossy().into_owned(),
            query: query.map(str::to_string),
            headers: HeaderVec::new(),
            query_params: query.map(parse_urlencoded).unwrap_or_default(),
            form_params: ParamVec::new(),
            body: Vec::new(),
        }
    }

    /// Add a header. The name is stored lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .push((Arc::from(name.to_ascii_lowercase().as_str()), value.into()));
        self
    }

    /// Attach a raw body and re-parse form parameters from it.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.parse_form_body();
        self
    }

    /// Attach an urlencoded form body, setting the matching content type.
    #[must_use]
    pub fn with_form_body(self, body: &str) -> Self {
        self.with_header("content-type", FORM_CONTENT_TYPE)
            .with_body(body.as_bytes().to_vec())
    }

    /// Populate `form_params` from the body.
    ///
    /// Only POST, PUT and PATCH bodies are considered, matching what browsers
    /// submit for HTML forms. Both urlencoded and `multipart/form-data`
    /// bodies are decoded; multipart file parts are skipped.
    pub fn parse_form_body(&mut self) {
        self.form_params.clear();
        if !matches!(self.method, Method::POST | Method::PUT | Method::PATCH) {
            return;
        }
        let Some(content_type) = self.get_header("content-type") else {
            return;
        };
        let mime = content_type.split(';').next().unwrap_or_default().trim();
        if mime.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
            self.form_params = url::form_urlencoded::parse(&self.body)
                .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
                .collect();
        } else if mime.eq_ignore_ascii_case(MULTIPART_CONTENT_TYPE) {
            match parse_multipart_fields(content_type, &self.body) {
                Ok(fields) => self.form_params = fields,
                Err(err) => debug!(
                    request_id = %self.request_id,
                    error = %err,
                    "Ignoring malformed multipart body"
                ),
            }
        }
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name; the first occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        first_param(&self.query_params, name)
    }

    /// Get a form value by name.
    ///
    /// Body parameters take precedence over query parameters and the first
    /// occurrence wins, the same lookup order browsers' form submissions rely on.
    #[must_use]
    pub fn form_value(&self, name: &str) -> Option<&str> {
        first_param(&self.form_params, name).or_else(|| first_param(&self.query_params, name))
    }
}

fn first_param<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}

/// Text fields of a `multipart/form-data` body, in arrival order.
///
/// The body is already in memory, so the multer stream is a single chunk
/// and the future resolves without ever waiting.
fn parse_multipart_fields(content_type: &str, body: &[u8]) -> Result<ParamVec, multer::Error> {
    let boundary = multer::parse_boundary(content_type)?;
    let chunk = Bytes::copy_from_slice(body);
    let stream = stream::once(future::ready(Ok::<_, std::io::Error>(chunk)));
    let mut multipart = multer::Multipart::new(stream, boundary);

    executor::block_on(async move {
        let mut fields = ParamVec::new();
        while let Some(field) = multipart.next_field().await? {
            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(Arc::<str>::from) else {
                continue;
            };
            fields.push((name, field.text().await?));
        }
        Ok::<_, multer::Error>(fields)
    })
}

/// Decode an urlencoded query string into parameters.
#[must_use]
pub fn parse_urlencoded(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}

/// Response data produced by a handler or by the dispatcher's fallbacks.
///
/// `Value::String` bodies are written as text, `Value::Null` as an empty body
/// and everything else as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body
    pub body: Value,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::ok()
    }
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// `200 OK` with no body.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(StatusCode::OK.as_u16(), HeaderVec::new(), Value::Null)
    }

    /// Plain text response.
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "text/plain; charset=utf-8".to_string()));
        Self::new(status, headers, Value::String(body.into()))
    }

    /// Create a JSON response with default headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self::new(status, headers, body)
    }

    /// Create a JSON error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Text response whose body is the status' canonical reason phrase.
    #[must_use]
    pub fn status_text(status: StatusCode) -> Self {
        Self::text(status.as_u16(), status.canonical_reason().unwrap_or_default())
    }

    /// Redirect to `location` with no body.
    #[must_use]
    pub fn redirect(status: StatusCode, location: String) -> Self {
        let mut res = Self::new(status.as_u16(), HeaderVec::new(), Value::Null);
        res.set_header("location", location);
        res
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
    }
}

/// Anything that can turn a request into a response.
///
/// Implemented for every `Fn(&HandlerRequest) -> HandlerResponse`, so plain
/// closures and functions can be registered directly.
pub trait Handler: Send + Sync {
    fn handle(&self, req: &HandlerRequest) -> HandlerResponse;
}

impl<F> Handler for F
where
    F: Fn(&HandlerRequest) -> HandlerResponse + Send + Sync,
{
    fn handle(&self, req: &HandlerRequest) -> HandlerResponse {
        self(req)
    }
}

/// Handler shared between routes (GET and its HEAD shadow share one).
pub type SharedHandler = Arc<dyn Handler>;

/// Terminal state a request reached inside the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A registered handler produced the response
    Matched,
    /// A trailing-slash shadow route redirected the client
    Redirected,
    /// OPTIONS on a known path: `Allow` header only
    Preflight,
    /// Path is known but not for this method
    MethodNotAllowed,
    /// Nothing matched; the not-found handler answered
    NotFound,
}

/// Serve-time side of the router: an immutable route table plus configuration.
///
/// Built by [`crate::router::Router::build`]. Cloning is cheap, the table is
/// behind an `Arc`.
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
    config: RouterConfig,
    /// Ordered list of middleware wrapped around the whole dispatch
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    pub(crate) fn new(
        table: RouteTable,
        config: RouterConfig,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        Self {
            table: Arc::new(table),
            config,
            middlewares,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Registered routes, sorted by path then method.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.table.routes()
    }

    /// Methods registered for `path`, in `Allow` header order.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> AllowedMethods {
        self.table.allowed_methods(path)
    }

    /// Method used for lookup after applying the `_method` form override.
    ///
    /// Only POST requests may be overridden. `None` means the override value
    /// is not a valid method token, so no route can match it.
    #[must_use]
    pub fn effective_method(req: &HandlerRequest) -> Option<Method> {
        if req.method != Method::POST {
            return Some(req.method.clone());
        }
        match req.form_value(METHOD_OVERRIDE_FIELD) {
            Some(value) if !value.is_empty() => {
                let upper = value.to_ascii_uppercase();
                match Method::from_bytes(upper.as_bytes()) {
                    Ok(method) => {
                        debug!(
                            request_id = %req.request_id,
                            override_method = %method,
                            "Form method override applied"
                        );
                        Some(method)
                    }
                    Err(_) => {
                        debug!(
                            request_id = %req.request_id,
                            override_value = %value,
                            "Ignoring invalid form method override"
                        );
                        None
                    }
                }
            }
            _ => Some(Method::POST),
        }
    }

    /// Run the middleware chain around [`Dispatcher::resolve`].
    ///
    /// A middleware whose `before` returns a response short-circuits the
    /// lookup; every middleware still sees the final response in `after`.
    pub fn dispatch(&self, req: &HandlerRequest) -> HandlerResponse {
        let start = Instant::now();
        let short_circuit = self.middlewares.iter().find_map(|mw| mw.before(req));
        let mut response = match short_circuit {
            Some(response) => response,
            None => self.resolve(req).1,
        };
        let latency = start.elapsed();
        for mw in &self.middlewares {
            mw.after(req, &mut response, latency);
        }
        response
    }

    /// Resolve a request to its response without running middleware.
    pub fn resolve(&self, req: &HandlerRequest) -> (Outcome, HandlerResponse) {
        let method = Self::effective_method(req);

        if let Some(route) = method
            .as_ref()
            .and_then(|m| self.table.get(m, &req.path))
        {
            return match route {
                Route::Handler(handler) => {
                    debug!(
                        request_id = %req.request_id,
                        method = %req.method,
                        path = %req.path,
                        "Route matched"
                    );
                    (Outcome::Matched, handler.handle(req))
                }
                Route::SlashRedirect => {
                    let response = slash_redirect(req);
                    debug!(
                        request_id = %req.request_id,
                        path = %req.path,
                        status = response.status,
                        location = ?response.get_header("location"),
                        "Trailing slash redirect"
                    );
                    (Outcome::Redirected, response)
                }
            };
        }

        if self.config.handle_method_not_allowed {
            if let Some(allow) = self.table.allow_header(&req.path) {
                if method == Some(Method::OPTIONS) {
                    debug!(
                        request_id = %req.request_id,
                        path = %req.path,
                        allow = %allow,
                        "Preflight answered"
                    );
                    let mut response = HandlerResponse::ok();
                    response.set_header("allow", allow);
                    return (Outcome::Preflight, response);
                }
                debug!(
                    request_id = %req.request_id,
                    method = ?method,
                    path = %req.path,
                    allow = %allow,
                    "Method not allowed"
                );
                let mut response = HandlerResponse::status_text(StatusCode::METHOD_NOT_ALLOWED);
                response.set_header("allow", allow);
                return (Outcome::MethodNotAllowed, response);
            }
        }

        debug!(
            request_id = %req.request_id,
            method = ?method,
            path = %req.path,
            custom_handler = self.config.not_found.is_some(),
            "Route not found"
        );
        let response = match &self.config.not_found {
            Some(handler) => handler.handle(req),
            None => HandlerResponse::status_text(StatusCode::NOT_FOUND),
        };
        (Outcome::NotFound, response)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.table.len())
            .field("config", &self.config)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}
