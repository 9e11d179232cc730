use http::Method;
use muxrouter::config::{RouterConfig, RouterOptions};
use muxrouter::dispatcher::{HandlerRequest, HandlerResponse};
use muxrouter::router::Router;
use std::io::Write;

fn ok(_req: &HandlerRequest) -> HandlerResponse {
    HandlerResponse::text(200, "ok")
}

fn write_options(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("muxrouter_")
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_options_from_file() {
    let file = write_options(
        "redirect_trailing_slash = false\nhandle_method_not_allowed = false\n",
    );
    let options = RouterOptions::load(file.path()).unwrap();
    assert!(!options.redirect_trailing_slash);
    assert!(!options.handle_method_not_allowed);
}

#[test]
fn test_loaded_options_drive_the_router() {
    let file = write_options("redirect_trailing_slash = false\n");
    let config = RouterConfig::from(RouterOptions::load(file.path()).unwrap());
    assert!(config.handle_method_not_allowed);

    let mut router = Router::with_config(config);
    router.on_get("/hello", ok);
    let dispatcher = router.build();

    let res = dispatcher.dispatch(&HandlerRequest::new(Method::GET, "/hello/"));
    assert_eq!(res.status, 404);
    let res = dispatcher.dispatch(&HandlerRequest::new(Method::POST, "/hello"));
    assert_eq!(res.status, 405);
}

#[test]
fn test_empty_file_uses_defaults() {
    let file = write_options("");
    let options = RouterOptions::load(file.path()).unwrap();
    assert_eq!(options, RouterOptions::default());
}

#[test]
fn test_missing_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = RouterOptions::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.toml"));
}

#[test]
fn test_bad_value_is_rejected() {
    let file = write_options("redirect_trailing_slash = \"yes\"\n");
    assert!(RouterOptions::load(file.path()).is_err());
}

#[test]
fn test_config_debug_hides_handler() {
    let config = RouterConfig::new().not_found(ok);
    let debug = format!("{config:?}");
    assert!(debug.contains("redirect_trailing_slash: true"));
    assert!(debug.contains("not_found"));
}
