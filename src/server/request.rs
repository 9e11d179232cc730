use crate::dispatcher::{HandlerRequest, HeaderVec};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use http::method::InvalidMethod;
use http::Method;
use may_minihttp::Request;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, warn};

/// Build a [`HandlerRequest`] from raw request parts.
///
/// Header names are lower-cased, the request id is taken from
/// `x-request-id` when it holds a valid ULID, and urlencoded form bodies are
/// decoded.
///
/// # Errors
///
/// Returns `InvalidMethod` if `method` is not a valid HTTP method token.
pub fn build_request<'a>(
    method: &str,
    target: &str,
    headers: impl IntoIterator<Item = (&'a str, &'a [u8])>,
    body: Vec<u8>,
) -> Result<HandlerRequest, InvalidMethod> {
    let method = Method::from_bytes(method.as_bytes())?;
    let mut req = HandlerRequest::new(method, target);
    req.headers = headers
        .into_iter()
        .map(|(name, value)| {
            (
                Arc::from(name.to_ascii_lowercase().as_str()),
                String::from_utf8_lossy(value).into_owned(),
            )
        })
        .collect::<HeaderVec>();
    let request_id = RequestId::from_header_or_new(req.get_header(REQUEST_ID_HEADER));
    req.request_id = request_id;
    req.body = body;
    req.parse_form_body();
    Ok(req)
}

/// Convert a `may_minihttp::Request` into a [`HandlerRequest`].
///
/// # Errors
///
/// Returns `InvalidMethod` if the request line carries an invalid method.
pub fn parse_request(req: Request) -> Result<HandlerRequest, InvalidMethod> {
    let method = req.method().to_string();
    let target = req.path().to_string();
    let headers: Vec<(String, Vec<u8>)> = req
        .headers()
        .iter()
        .map(|h| (h.name.to_string(), h.value.to_vec()))
        .collect();

    let mut body = Vec::new();
    if let Err(err) = req.body().read_to_end(&mut body) {
        warn!(error = %err, method = %method, target = %target, "Failed to read request body");
        body.clear();
    }

    let parsed = build_request(
        &method,
        &target,
        headers.iter().map(|(n, v)| (n.as_str(), v.as_slice())),
        body,
    )?;

    debug!(
        request_id = %parsed.request_id,
        method = %parsed.method,
        path = %parsed.path,
        headers_count = parsed.headers.len(),
        body_size_bytes = parsed.body.len(),
        form_fields = parsed.form_params.len(),
        "HTTP request parsed"
    );
    Ok(parsed)
}
