//! # Router Module
//!
//! Route registration and the route table behind every lookup.
//!
//! ## Overview
//!
//! Routes are matched on the exact `(method, path)` pair. There are no path
//! parameters, wildcards or prefix matches: `/foo/bar` matches only
//! `/foo/bar`.
//!
//! ```text
//! Path: /foo/bar
//!
//! Requests:
//!  /foo/bar        matches the handler
//!  /foo/bar/       doesn't match, but redirects to /foo/bar
//!  /foo/foo        doesn't match
//!  /foo            doesn't match
//! ```
//!
//! ## Architecture
//!
//! 1. **Registration**: [`Router`] validates each path (it must start with
//!    `/`), stores the handler and, when trailing-slash redirects are enabled,
//!    a shadow entry for `path/` that redirects back to `path`.
//!
//! 2. **Freezing**: [`Router::build`] moves the table into an immutable
//!    [`Dispatcher`](crate::dispatcher::Dispatcher).
//!
//! ## Example
//!
//! ```rust
//! use muxrouter::dispatcher::{HandlerRequest, HandlerResponse};
//! use muxrouter::router::Router;
//!
//! fn index(_req: &HandlerRequest) -> HandlerResponse {
//!     HandlerResponse::text(200, "Welcome!\n")
//! }
//!
//! let mut router = Router::new();
//! router.on_get("/", index).on_post("/items", index);
//!
//! assert_eq!(
//!     router.table().allow_header("/items").as_deref(),
//!     Some("POST")
//! );
//! ```

mod core;
mod error;
mod table;
#[cfg(test)]
mod tests;

pub use self::core::Router;
pub use error::{validate_path, RouteError};
pub use table::{AllowedMethods, Route, RouteInfo, RouteKind, RouteTable, SUPPORTED_METHODS};
