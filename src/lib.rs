//! # muxrouter
//!
//! **muxrouter** is an exact-match HTTP request router: it dispatches each
//! request to the handler registered for its method and path, and answers
//! everything else with a consistent fallback chain.
//!
//! ## Overview
//!
//! - Routes are `(method, path)` pairs; a path must start with `/`
//! - `path/` redirects to `path` (301 for GET, 308 otherwise) unless disabled
//! - A known path requested with the wrong method yields `405` and an `Allow`
//!   header; `OPTIONS` gets just the `Allow` header
//! - HTML forms can tunnel PUT/PATCH/DELETE through POST with a `_method` field
//! - Unknown paths go to a configurable not-found handler
//!
//! ## Architecture
//!
//! - **[`router`]** - registration and the route table
//! - **[`dispatcher`]** - request/response types, handlers and the per-request state machine
//! - **[`config`]** - router options, also loadable from TOML
//! - **[`middleware`]** - hooks around the whole dispatch (tracing, metrics)
//! - **[`server`]** - `may_minihttp` adapter with live dispatcher swaps
//! - **[`telemetry`]** - `tracing` subscriber setup
//! - **[`runtime_config`]** - environment-driven server settings
//!
//! ```mermaid
//! flowchart LR
//!     Router -- build --> Dispatcher
//!     Request --> Override[method override]
//!     Override --> Lookup{exact lookup}
//!     Lookup -- handler --> Handler
//!     Lookup -- shadow route --> Redirect[301 / 308]
//!     Lookup -- miss --> Allowed{allowed methods?}
//!     Allowed -- yes --> NotAllowed[405 + Allow]
//!     Allowed -- no --> NotFound[404]
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use muxrouter::dispatcher::{HandlerRequest, HandlerResponse};
//! use muxrouter::router::Router;
//! use muxrouter::server::{AppService, HttpServer};
//!
//! fn index(_req: &HandlerRequest) -> HandlerResponse {
//!     HandlerResponse::text(200, "Welcome to index!")
//! }
//!
//! fn hello(_req: &HandlerRequest) -> HandlerResponse {
//!     HandlerResponse::text(200, "Welcome to hello!")
//! }
//!
//! let mut router = Router::new();
//! router.on_get("/", index).on_get("/hello", hello);
//!
//! let handle = HttpServer(AppService::new(router.build()))
//!     .start("0.0.0.0:8080")
//!     .expect("bind");
//! handle.join().ok();
//! ```

pub mod config;
pub mod dispatcher;
pub mod ids;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod telemetry;

pub use config::{RouterConfig, RouterOptions};
pub use dispatcher::{Dispatcher, Handler, HandlerRequest, HandlerResponse, Outcome};
pub use http::Method;
pub use router::{RouteError, Router};
