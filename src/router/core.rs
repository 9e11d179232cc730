//! Router core module - route registration.
//!
//! The [`Router`] is the build-time half: it validates paths, fills the
//! [`RouteTable`] and synthesizes trailing-slash shadow routes. Once every
//! route is registered, [`Router::build`] freezes it into a
//! [`Dispatcher`] that is only ever read.

use http::Method;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::{validate_path, RouteError};
use super::table::{Route, RouteInfo, RouteTable};
use crate::config::RouterConfig;
use crate::dispatcher::{Dispatcher, Handler, SharedHandler};
use crate::middleware::Middleware;

/// Registrar that maps `(method, path)` pairs to handlers.
///
/// Re-registering a pair overwrites the previous handler; the last
/// registration wins.
pub struct Router {
    table: RouteTable,
    config: RouterConfig,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Router with every option enabled and the default not-found response.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Router using `config`. The configuration cannot change afterwards,
    /// which keeps shadow-route creation consistent across registrations.
    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            table: RouteTable::new(),
            config,
            middlewares: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Register `handler` for GET and HEAD on `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or does not start with `/`.
    pub fn on_get<H: Handler + 'static>(&mut self, path: &str, handler: H) -> &mut Self {
        let handler: SharedHandler = Arc::new(handler);
        self.on_method_arc(Method::HEAD, path, Arc::clone(&handler));
        self.on_method_arc(Method::GET, path, handler)
    }

    /// Register `handler` for HEAD on `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or does not start with `/`.
    pub fn on_head<H: Handler + 'static>(&mut self, path: &str, handler: H) -> &mut Self {
        self.on_method(Method::HEAD, path, handler)
    }

    /// Register `handler` for POST on `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or does not start with `/`.
    pub fn on_post<H: Handler + 'static>(&mut self, path: &str, handler: H) -> &mut Self {
        self.on_method(Method::POST, path, handler)
    }

    /// Register `handler` for PUT on `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or does not start with `/`.
    pub fn on_put<H: Handler + 'static>(&mut self, path: &str, handler: H) -> &mut Self {
        self.on_method(Method::PUT, path, handler)
    }

    /// Register `handler` for PATCH on `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or does not start with `/`.
    pub fn on_patch<H: Handler + 'static>(&mut self, path: &str, handler: H) -> &mut Self {
        self.on_method(Method::PATCH, path, handler)
    }

    /// Register `handler` for DELETE on `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or does not start with `/`.
    pub fn on_delete<H: Handler + 'static>(&mut self, path: &str, handler: H) -> &mut Self {
        self.on_method(Method::DELETE, path, handler)
    }

    /// Register `handler` for OPTIONS on `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or does not start with `/`.
    pub fn on_options<H: Handler + 'static>(&mut self, path: &str, handler: H) -> &mut Self {
        self.on_method(Method::OPTIONS, path, handler)
    }

    /// Register `handler` for an arbitrary method on `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or does not start with `/`.
    pub fn on_method<H: Handler + 'static>(
        &mut self,
        method: Method,
        path: &str,
        handler: H,
    ) -> &mut Self {
        self.on_method_arc(method, path, Arc::new(handler))
    }

    /// Register an already shared handler.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or does not start with `/`. A bad path is a
    /// programming error and must stop startup rather than surface as a
    /// request-time response.
    #[allow(clippy::panic)]
    pub fn on_method_arc(
        &mut self,
        method: Method,
        path: &str,
        handler: SharedHandler,
    ) -> &mut Self {
        if let Err(err) = self.try_on_method_arc(method, path, handler) {
            panic!("{err}");
        }
        self
    }

    /// Fallible form of [`Router::on_method`]. Nothing is inserted on error.
    pub fn try_on_method<H: Handler + 'static>(
        &mut self,
        method: Method,
        path: &str,
        handler: H,
    ) -> Result<(), RouteError> {
        self.try_on_method_arc(method, path, Arc::new(handler))
    }

    /// Fallible form of [`Router::on_method_arc`]. Nothing is inserted on error.
    pub fn try_on_method_arc(
        &mut self,
        method: Method,
        path: &str,
        handler: SharedHandler,
    ) -> Result<(), RouteError> {
        validate_path(path)?;

        self.insert(method.clone(), path.to_string(), Route::Handler(handler));

        if self.config.redirect_trailing_slash && path.len() > 1 && !path.ends_with('/') {
            self.insert(method, format!("{path}/"), Route::SlashRedirect);
        }
        Ok(())
    }

    fn insert(&mut self, method: Method, path: String, route: Route) {
        let kind = route.kind();
        match self.table.insert(method.clone(), path.clone(), route) {
            Some(previous) => warn!(
                method = %method,
                path = %path,
                previous = ?previous.kind(),
                kind = ?kind,
                "Replaced existing route"
            ),
            None => debug!(method = %method, path = %path, kind = ?kind, "Route registered"),
        }
    }

    /// Wrap the whole dispatch in `mw`. Middleware runs in the order added.
    pub fn use_middleware(&mut self, mw: Arc<dyn Middleware>) -> &mut Self {
        self.middlewares.push(mw);
        self
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

    /// Log every registered route at `info`.
    pub fn dump_routes(&self) {
        for route in self.table.routes() {
            info!(method = %route.method, path = %route.path, kind = ?route.kind, "Route");
        }
    }

    /// Freeze the table and configuration into a [`Dispatcher`].
    #[must_use]
    pub fn build(self) -> Dispatcher {
        info!(
            routes_count = self.table.len(),
            redirect_trailing_slash = self.config.redirect_trailing_slash,
            handle_method_not_allowed = self.config.handle_method_not_allowed,
            custom_not_found = self.config.not_found.is_some(),
            middlewares = self.middlewares.len(),
            "Routing table loaded"
        );
        Dispatcher::new(self.table, self.config, self.middlewares)
    }
}
