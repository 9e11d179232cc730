use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Middleware for collecting Prometheus-compatible routing metrics
///
/// All counters use atomic operations for thread-safe updates without locks.
///
/// Metrics collected:
/// - Total request count
/// - Average latency (dispatch time)
/// - Trailing-slash redirects (301/308)
/// - Not found (404) and method not allowed (405) responses
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    redirects: AtomicUsize,
    not_found: AtomicUsize,
    method_not_allowed: AtomicUsize,
}

impl MetricsMiddleware {
    /// Create a new metrics middleware with all counters initialized to zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of requests processed
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean dispatch time, zero before the first request.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    #[must_use]
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn not_found(&self) -> usize {
        self.not_found.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn method_not_allowed(&self) -> usize {
        self.method_not_allowed.load(Ordering::Relaxed)
    }

    /// Render the counters in the Prometheus text exposition format.
    #[must_use]
    pub fn render_prometheus(&self) -> String {
        let mut out = String::new();
        let counters = [
            (
                "muxrouter_requests_total",
                "Total number of dispatched requests",
                self.request_count(),
            ),
            (
                "muxrouter_redirects_total",
                "Trailing slash redirects issued",
                self.redirects(),
            ),
            (
                "muxrouter_not_found_total",
                "Requests answered with 404",
                self.not_found(),
            ),
            (
                "muxrouter_method_not_allowed_total",
                "Requests answered with 405",
                self.method_not_allowed(),
            ),
        ];
        for (name, help, value) in counters {
            out.push_str(&format!(
                "# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n"
            ));
        }
        out.push_str(&format!(
            "# HELP muxrouter_request_latency_seconds Average dispatch latency in seconds\n\
             # TYPE muxrouter_request_latency_seconds gauge\n\
             muxrouter_request_latency_seconds {}\n",
            self.average_latency().as_secs_f64()
        ));
        out
    }
}

impl Middleware for MetricsMiddleware {
    // Count and latency move together; `before` is skipped on short-circuits.
    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        match res.status {
            301 | 308 if res.get_header("location").is_some() => {
                self.redirects.fetch_add(1, Ordering::Relaxed);
            }
            404 => {
                self.not_found.fetch_add(1, Ordering::Relaxed);
            }
            405 => {
                self.method_not_allowed.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }
}
