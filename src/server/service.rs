use super::request::parse_request;
use super::response::{pin_route_headers, write_handler_response};
use crate::dispatcher::{Dispatcher, HandlerResponse};
use arc_swap::ArcSwap;
use http::{Method, StatusCode};
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;
use tracing::{info, warn};

/// `may_minihttp` service that feeds every request through a [`Dispatcher`].
///
/// The dispatcher sits behind an `ArcSwap`: each request loads the current
/// one without locking, and [`AppService::replace_dispatcher`] swaps in a
/// freshly built table for live route changes. Tables are never edited in
/// place.
#[derive(Clone)]
pub struct AppService {
    dispatcher: Arc<ArcSwap<Dispatcher>>,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        pin_route_headers(dispatcher.table());
        Self {
            dispatcher: Arc::new(ArcSwap::from_pointee(dispatcher)),
        }
    }

    /// Snapshot of the dispatcher currently serving requests.
    #[must_use]
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.load_full()
    }

    /// Swap in a new dispatcher. In-flight requests finish on the old one.
    pub fn replace_dispatcher(&self, dispatcher: Dispatcher) {
        let routes_count = dispatcher.table().len();
        pin_route_headers(dispatcher.table());
        self.dispatcher.store(Arc::new(dispatcher));
        info!(routes_count, "Dispatcher replaced");
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let handler_req = match parse_request(req) {
            Ok(handler_req) => handler_req,
            Err(err) => {
                warn!(error = %err, "Rejected request with invalid method");
                return write_handler_response(
                    res,
                    &Method::GET,
                    &HandlerResponse::status_text(StatusCode::BAD_REQUEST),
                );
            }
        };

        let dispatcher = self.dispatcher.load();
        let response = dispatcher.dispatch(&handler_req);
        write_handler_response(res, &handler_req.method, &response)
    }
}
