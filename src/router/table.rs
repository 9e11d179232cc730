//! Route table and allowed-methods resolver.
//!
//! Routes are keyed by method first and path second, so a method and a path
//! can never blur into one another the way a concatenated string key could.

use http::Method;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

use crate::dispatcher::SharedHandler;

/// Methods the resolver reports, in `Allow` header order.
pub const SUPPORTED_METHODS: [Method; 7] = [
    Method::HEAD,
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
];

/// Ordered, deduplicated method list; never spills to the heap.
pub type AllowedMethods = SmallVec<[Method; 7]>;

/// What a table entry does when it is hit.
#[derive(Clone)]
pub enum Route {
    /// A registered handler
    Handler(SharedHandler),
    /// Synthetic trailing-slash entry that redirects to the slash-less path
    SlashRedirect,
}

impl Route {
    #[must_use]
    pub fn kind(&self) -> RouteKind {
        match self {
            Route::Handler(_) => RouteKind::Handler,
            Route::SlashRedirect => RouteKind::SlashRedirect,
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.kind(), f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Handler,
    SlashRedirect,
}

/// One row of the route table, for introspection and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub method: String,
    pub path: String,
    pub kind: RouteKind,
}

/// Exact-match mapping of `(method, path)` to a [`Route`].
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: HashMap<Method, HashMap<String, Route>>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry, returning the previous one.
    pub fn insert(&mut self, method: Method, path: String, route: Route) -> Option<Route> {
        self.routes.entry(method).or_default().insert(path, route)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes.get(method)?.get(path)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, method: &Method, path: &str) -> bool {
        self.get(method, path).is_some()
    }

    /// Number of entries, shadow routes included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Methods with an entry for `path`, in [`SUPPORTED_METHODS`] order.
    ///
    /// Shadow routes count: a GET on `/foo` makes `/foo/` answer
    /// `Allow: HEAD, GET` to other methods.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> AllowedMethods {
        SUPPORTED_METHODS
            .iter()
            .filter(|method| self.contains(method, path))
            .cloned()
            .collect()
    }

    /// `Allow` header value for `path`, or `None` when no method is registered.
    #[must_use]
    pub fn allow_header(&self, path: &str) -> Option<String> {
        let allowed = self.allowed_methods(path);
        if allowed.is_empty() {
            return None;
        }
        let names: SmallVec<[&str; 7]> = allowed.iter().map(Method::as_str).collect();
        Some(names.join(", "))
    }

    /// Every entry, sorted by path and then by [`SUPPORTED_METHODS`] order
    /// (other methods last, alphabetically).
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        let mut rows: Vec<(usize, RouteInfo)> = self
            .routes
            .iter()
            .flat_map(|(method, paths)| {
                let rank = SUPPORTED_METHODS
                    .iter()
                    .position(|m| m == method)
                    .unwrap_or(SUPPORTED_METHODS.len());
                paths.iter().map(move |(path, route)| {
                    (
                        rank,
                        RouteInfo {
                            method: method.to_string(),
                            path: path.clone(),
                            kind: route.kind(),
                        },
                    )
                })
            })
            .collect();
        rows.sort_by(|(ra, a), (rb, b)| {
            a.path
                .cmp(&b.path)
                .then(ra.cmp(rb))
                .then_with(|| a.method.cmp(&b.method))
        });
        rows.into_iter().map(|(_, info)| info).collect()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.routes()).finish()
    }
}
