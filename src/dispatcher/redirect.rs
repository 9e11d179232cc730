use http::{Method, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::core::{HandlerRequest, HandlerResponse};

/// Bytes escaped when a decoded path is written back into a URL. Unreserved
/// characters and the sub-delimiters allowed in a path segment stay literal.
const PATH_ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');

/// `Location` for a trailing-slash shadow route: `path` (decoded) with one
/// trailing `/` removed and re-encoded, followed by the raw query if any.
#[must_use]
pub fn slash_redirect_location(path: &str, query: Option<&str>) -> String {
    let target = path.strip_suffix('/').unwrap_or(path);
    let target = utf8_percent_encode(target, PATH_ESCAPE_SET);
    match query {
        Some(query) if !query.is_empty() => format!("{target}?{query}"),
        _ => target.to_string(),
    }
}

/// Handler behind every trailing-slash shadow route.
///
/// Strips exactly one trailing `/` and keeps the query string. GET gets
/// `301 Moved Permanently`; every other method gets `308 Permanent Redirect`
/// so clients replay the same method and body. The status is chosen from the
/// method on the wire, not the form override.
#[must_use]
pub fn slash_redirect(req: &HandlerRequest) -> HandlerResponse {
    let location = slash_redirect_location(&req.path, req.query.as_deref());
    let status = if req.method == Method::GET {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::PERMANENT_REDIRECT
    };
    HandlerResponse::redirect(status, location)
}
