//! End-to-end tests through the `may_minihttp` server.
//!
//! Each fixture binds to an ephemeral port, talks raw HTTP/1.1 over a
//! `TcpStream` and stops the server on drop.

use http::Method;
use muxrouter::dispatcher::{HandlerRequest, HandlerResponse};
use muxrouter::middleware::TracingMiddleware;
use muxrouter::router::Router;
use muxrouter::server::{AppService, HttpServer, ServerHandle};
use serde_json::json;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

mod common;
use common::http::send_request;
use common::test_server::setup_may_runtime;
use common::test_tracing::TestTracing;

struct TestServer {
    _tracing: TestTracing,
    service: AppService,
    handle: Option<ServerHandle>,
    addr: SocketAddr,
}

impl TestServer {
    fn start(router: Router) -> Self {
        setup_may_runtime();
        let tracing = TestTracing::init();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = AppService::new(router.build());
        let handle = HttpServer(service.clone()).start(addr).unwrap();
        handle.wait_ready().unwrap();
        Self {
            _tracing: tracing,
            service,
            handle: Some(handle),
            addr,
        }
    }

    fn get(&self, target: &str) -> common::http::RawResponse {
        send_request(
            &self.addr,
            &format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n"),
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

fn demo_router() -> Router {
    let mut router = Router::new();
    router.use_middleware(Arc::new(TracingMiddleware));
    router
        .on_get("/", |_req: &HandlerRequest| HandlerResponse::text(200, "Welcome!\n"))
        .on_get("/hello", |_req: &HandlerRequest| HandlerResponse::text(200, "Hello\n"))
        .on_get("/json", |_req: &HandlerRequest| {
            HandlerResponse::json(200, json!({ "ok": true }))
        })
        .on_put("/items", |req: &HandlerRequest| {
            let name = req.form_value("name").unwrap_or("none");
            HandlerResponse::text(200, format!("put {name}"))
        });
    router
}

#[test]
fn test_get_routes() {
    let server = TestServer::start(demo_router());

    let res = server.get("/");
    assert_eq!(res.status, 200);
    assert_eq!(res.body, "Welcome!\n");
    assert!(res.header("content-type").unwrap().starts_with("text/plain"));

    let res = server.get("/hello");
    assert_eq!(res.body, "Hello\n");
}

#[test]
fn test_json_body() {
    let server = TestServer::start(demo_router());
    let res = server.get("/json");
    assert_eq!(res.status, 200);
    assert_eq!(res.header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(body, json!({ "ok": true }));
}

#[test]
fn test_trailing_slash_redirect_over_the_wire() {
    let server = TestServer::start(demo_router());

    let res = server.get("/hello/?lang=en");
    assert_eq!(res.status, 301);
    assert_eq!(res.header("location"), Some("/hello?lang=en"));

    let res = send_request(
        &server.addr,
        "PUT /items/ HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\n\r\n",
    );
    assert_eq!(res.status, 308);
    assert_eq!(res.header("location"), Some("/items"));
}

#[test]
fn test_method_not_allowed_over_the_wire() {
    let server = TestServer::start(demo_router());
    let res = send_request(
        &server.addr,
        "DELETE /hello HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(res.status, 405);
    assert_eq!(res.header("allow"), Some("HEAD, GET"));
    assert_eq!(res.body, "Method Not Allowed");
}

#[test]
fn test_options_preflight_over_the_wire() {
    let server = TestServer::start(demo_router());
    let res = send_request(
        &server.addr,
        "OPTIONS /items HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(res.status, 200);
    assert_eq!(res.header("allow"), Some("PUT"));
    assert!(res.body.is_empty());
}

#[test]
fn test_unknown_path_is_404() {
    let server = TestServer::start(demo_router());
    let res = server.get("/nope");
    assert_eq!(res.status, 404);
    assert_eq!(res.body, "Not Found");
}

#[test]
fn test_head_omits_body() {
    let server = TestServer::start(demo_router());
    let res = send_request(&server.addr, "HEAD /hello HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(res.status, 200);
    assert!(res.body.is_empty());
}

#[test]
fn test_form_post_tunnels_put() {
    let server = TestServer::start(demo_router());
    let form = "_method=put&name=widget";
    let res = send_request(
        &server.addr,
        &format!(
            "POST /items HTTP/1.1\r\nHost: localhost\r\n\
             Content-Type: application/x-www-form-urlencoded\r\n\
             Content-Length: {}\r\n\r\n{form}",
            form.len()
        ),
    );
    assert_eq!(res.status, 200);
    assert_eq!(res.body, "put widget");
}

#[test]
fn test_replace_dispatcher_swaps_routes() {
    let server = TestServer::start(demo_router());
    assert_eq!(server.get("/new").status, 404);

    let mut router = Router::new();
    router.on_get("/new", |_req: &HandlerRequest| HandlerResponse::text(200, "new"));
    server.service.replace_dispatcher(router.build());

    let res = server.get("/new");
    assert_eq!(res.status, 200);
    assert_eq!(res.body, "new");
    assert_eq!(server.get("/hello").status, 404);
    assert!(server
        .service
        .dispatcher()
        .table()
        .contains(&Method::GET, "/new"));
}

#[test]
fn test_sixteen_handler_headers_are_capped() {
    let mut router = Router::new();
    router.on_get("/many", |_req: &HandlerRequest| {
        let mut res = HandlerResponse::text(200, "many");
        for i in 0..16 {
            res.set_header(&format!("x-h{i}"), "1");
        }
        res
    });
    let server = TestServer::start(router);

    let res = server.get("/many");
    assert_eq!(res.status, 200);
    assert_eq!(res.body, "many");
    assert!(res.header("content-type").unwrap().starts_with("text/plain"));
    assert_eq!(res.header("x-h0"), Some("1"));
    assert_eq!(res.header("x-h15"), None);
}

#[test]
fn test_redirect_location_is_re_encoded() {
    let mut router = Router::new();
    router.on_get("/a b", |req: &HandlerRequest| HandlerResponse::text(200, req.path.clone()));
    let server = TestServer::start(router);

    let res = server.get("/a%20b");
    assert_eq!(res.status, 200);
    assert_eq!(res.body, "/a b");

    for i in 0..50 {
        let res = server.get(&format!("/a%20b/?n={i}"));
        assert_eq!(res.status, 301);
        assert_eq!(res.header("location"), Some(format!("/a%20b?n={i}").as_str()));
    }
}
