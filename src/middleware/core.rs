use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Hook wrapped once around the whole dispatch, never per route.
///
/// `before` may answer the request itself by returning a response, in which
/// case the route lookup is skipped. `after` runs for every request with the
/// final response and the time spent dispatching.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
