use anyhow::{Context, Result};
use clap::Parser;
use muxrouter::config::{RouterConfig, RouterOptions};
use muxrouter::dispatcher::{HandlerRequest, HandlerResponse};
use muxrouter::middleware::{MetricsMiddleware, Middleware, TracingMiddleware};
use muxrouter::router::Router;
use muxrouter::runtime_config::RuntimeConfig;
use muxrouter::server::{AppService, HttpServer};
use muxrouter::telemetry::{self, LogConfig};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::info;

#[derive(Parser)]
#[command(name = "muxrouter")]
#[command(about = "Demo server for the muxrouter exact-match router", long_about = None)]
struct Cli {
    /// Address to bind (defaults to MUXR_ADDR or 0.0.0.0:8080)
    #[arg(long)]
    addr: Option<String>,

    /// TOML file with router options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level: trace/debug/info/warn/error
    #[arg(long, env = "MUXR_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log every registered route at startup
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Pretty debug logs with source locations, written synchronously
    #[arg(long, default_value_t = false)]
    dev: bool,
}

fn index(_req: &HandlerRequest) -> HandlerResponse {
    HandlerResponse::text(200, "Welcome!\n")
}

fn hello(_req: &HandlerRequest) -> HandlerResponse {
    HandlerResponse::text(200, "Hello\n")
}

fn build_router(config: RouterConfig, metrics: Arc<MetricsMiddleware>) -> Router {
    // Last value stored by PUT /items; a form POST with _method=put lands here too.
    let item = Arc::new(RwLock::new(String::from("nothing yet")));

    let mut router = Router::with_config(config);
    router.use_middleware(Arc::new(TracingMiddleware));
    router.use_middleware(Arc::clone(&metrics) as Arc<dyn Middleware>);

    router.on_get("/", index).on_get("/hello", hello);

    router.on_get("/metrics", move |_req: &HandlerRequest| {
        let mut res = HandlerResponse::text(200, metrics.render_prometheus());
        res.set_header("content-type", "text/plain; version=0.0.4");
        res
    });

    let current = Arc::clone(&item);
    router.on_get("/items", move |_req: &HandlerRequest| {
        let value = current.read().map(|v| v.clone()).unwrap_or_default();
        HandlerResponse::text(200, format!("item: {value}\n"))
    });
    router.on_put("/items", move |req: &HandlerRequest| {
        let Some(name) = req.form_value("name") else {
            return HandlerResponse::text(400, "missing form field 'name'\n");
        };
        match item.write() {
            Ok(mut slot) => {
                *slot = name.to_string();
                HandlerResponse::text(200, format!("stored: {name}\n"))
            }
            Err(_) => HandlerResponse::error(500, "item store poisoned"),
        }
    });

    router
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.dev {
        telemetry::init_logging_with_config(&LogConfig::default_dev())?;
    } else {
        telemetry::init_logging(&cli.log_level)?;
    }

    let runtime = RuntimeConfig::from_env();
    runtime.apply();

    let options = match &cli.config {
        Some(path) => RouterOptions::load(path)?,
        None => RouterOptions::default(),
    };
    let config = RouterConfig::from(options)
        .not_found(|req: &HandlerRequest| {
            HandlerResponse::text(404, format!("no route for {} {}\n", req.method, req.path))
        });

    let metrics = Arc::new(MetricsMiddleware::new());
    let router = build_router(config, metrics);
    if cli.verbose {
        router.dump_routes();
    }

    let addr = cli.addr.unwrap_or(runtime.addr);
    let handle = HttpServer(AppService::new(router.build()))
        .start(addr.as_str())
        .with_context(|| format!("Failed to start server on {addr}"))?;
    info!(addr = %handle.addr(), stack_size = runtime.stack_size, "Serving");

    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server coroutine panicked"))
}
