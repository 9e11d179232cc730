//! # Dispatcher Module
//!
//! The dispatcher is the serve-time half of the router. It owns a frozen
//! [`RouteTable`](crate::router::RouteTable) and the [`RouterConfig`](crate::config::RouterConfig)
//! it was built with, and turns each [`HandlerRequest`] into exactly one
//! [`HandlerResponse`].
//!
//! ## Request Flow
//!
//! 1. **Method resolution**: a POST carrying a non-empty `_method` form value
//!    is looked up under that method, upper-cased
//! 2. **Exact lookup** of `(effective method, path)`; a hit runs the handler,
//!    a trailing-slash shadow route answers with a 301/308 redirect
//! 3. **Method not allowed** (when enabled): if other methods exist for the
//!    path, answer 405 with an `Allow` header, or just the `Allow` header for
//!    OPTIONS
//! 4. **Not found**: the configured handler, or a plain 404
//!
//! ## Example
//!
//! ```rust
//! use muxrouter::dispatcher::{HandlerRequest, HandlerResponse};
//! use muxrouter::router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.on_get("/hello", |_req: &HandlerRequest| HandlerResponse::text(200, "Hello"));
//! let dispatcher = router.build();
//!
//! let res = dispatcher.dispatch(&HandlerRequest::new(Method::GET, "/hello/"));
//! assert_eq!(res.status, 301);
//! assert_eq!(res.get_header("location"), Some("/hello"));
//! ```

mod core;
mod redirect;

pub use self::core::{
    parse_urlencoded, Dispatcher, Handler, HandlerRequest, HandlerResponse, HeaderVec, Outcome,
    ParamVec, SharedHandler, FORM_CONTENT_TYPE, MAX_INLINE_HEADERS, MAX_INLINE_PARAMS,
    METHOD_OVERRIDE_FIELD, MULTIPART_CONTENT_TYPE,
};
pub use redirect::{slash_redirect, slash_redirect_location};
