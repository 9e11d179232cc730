use super::{validate_path, RouteError, RouteKind, Router};
use crate::config::RouterConfig;
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use http::Method;

fn noop(_req: &HandlerRequest) -> HandlerResponse {
    HandlerResponse::ok()
}

#[test]
fn test_validate_path() {
    assert!(validate_path("/").is_ok());
    assert!(validate_path("/a/b").is_ok());
    assert_eq!(validate_path(""), Err(RouteError::EmptyPath));
    assert_eq!(
        validate_path("bar"),
        Err(RouteError::MissingLeadingSlash {
            path: "bar".to_string()
        })
    );
}

#[test]
fn test_shadow_route_created() {
    let mut router = Router::new();
    router.on_post("/foo", noop);
    let kind = |path: &str| router.table().get(&Method::POST, path).map(|r| r.kind());
    assert_eq!(kind("/foo"), Some(RouteKind::Handler));
    assert_eq!(kind("/foo/"), Some(RouteKind::SlashRedirect));
}

#[test]
fn test_no_shadow_for_root_or_trailing_slash_paths() {
    let mut router = Router::new();
    router.on_post("/", noop).on_post("/bar/", noop);
    assert_eq!(router.table().len(), 2);
    assert!(!router.table().contains(&Method::POST, "//"));
    assert!(!router.table().contains(&Method::POST, "/bar//"));
}

#[test]
fn test_no_shadow_when_disabled() {
    let mut router = Router::with_config(RouterConfig::default().redirect_trailing_slash(false));
    router.on_post("/foo", noop);
    assert_eq!(router.table().len(), 1);
}

#[test]
fn test_get_registers_head() {
    let mut router = Router::new();
    router.on_get("/foo", noop);
    let table = router.table();
    for method in [Method::GET, Method::HEAD] {
        assert!(table.contains(&method, "/foo"));
        assert!(table.contains(&method, "/foo/"));
    }
    assert_eq!(table.len(), 4);
}

#[test]
fn test_try_on_method_inserts_nothing_on_error() {
    let mut router = Router::new();
    let err = router.try_on_method(Method::GET, "foo", noop).unwrap_err();
    assert_eq!(err.to_string(), "Path must begin with '/' in path 'foo'");
    assert!(router.table().is_empty());
}

#[test]
#[should_panic(expected = "Path must begin with '/'")]
fn test_on_method_panics_without_leading_slash() {
    let mut router = Router::new();
    router.on_delete("bar", noop);
}

#[test]
#[should_panic(expected = "Path must not be empty")]
fn test_on_method_panics_on_empty_path() {
    let mut router = Router::new();
    router.on_get("", noop);
}

#[test]
fn test_allowed_methods_order() {
    let mut router = Router::new();
    router
        .on_options("/x", noop)
        .on_patch("/x", noop)
        .on_delete("/x", noop)
        .on_put("/x", noop)
        .on_post("/x", noop)
        .on_get("/x", noop);
    assert_eq!(
        router.table().allow_header("/x").as_deref(),
        Some("HEAD, GET, POST, PUT, DELETE, PATCH, OPTIONS")
    );
    assert_eq!(router.table().allow_header("/y"), None);
}

#[test]
fn test_allowed_methods_ignore_unsupported_methods() {
    let mut router = Router::new();
    router.on_method(Method::TRACE, "/x", noop);
    assert!(router.table().allowed_methods("/x").is_empty());
    assert!(router.table().contains(&Method::TRACE, "/x"));
}

#[test]
fn test_routes_are_sorted() {
    let mut router = Router::with_config(RouterConfig::default().redirect_trailing_slash(false));
    router.on_post("/b", noop).on_get("/a", noop);
    let rows: Vec<(String, String)> = router
        .routes()
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("HEAD".to_string(), "/a".to_string()),
            ("GET".to_string(), "/a".to_string()),
            ("POST".to_string(), "/b".to_string()),
        ]
    );
}

#[test]
fn test_shared_handler_serves_two_routes() {
    let shared: crate::dispatcher::SharedHandler = std::sync::Arc::new(|req: &HandlerRequest| {
        HandlerResponse::text(200, format!("{} {}", req.method, req.path))
    });
    let mut router = Router::new();
    router
        .on_method_arc(Method::GET, "/a", std::sync::Arc::clone(&shared))
        .on_method_arc(Method::DELETE, "/b", shared);
    let dispatcher = router.build();

    let res = dispatcher.dispatch(&HandlerRequest::new(Method::GET, "/a"));
    assert_eq!(res.body.as_str(), Some("GET /a"));
    let res = dispatcher.dispatch(&HandlerRequest::new(Method::DELETE, "/b"));
    assert_eq!(res.body.as_str(), Some("DELETE /b"));
}
