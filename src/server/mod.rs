//! HTTP server adapter built on `may_minihttp`.
//!
//! Owns nothing but glue: raw requests become
//! [`HandlerRequest`](crate::dispatcher::HandlerRequest)s, go through the
//! current [`Dispatcher`](crate::dispatcher::Dispatcher), and the resulting
//! response is written back.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{build_request, parse_request};
pub use response::{pin_route_headers, write_handler_response};
pub use service::AppService;
