//! Response construction
//!
//! JSON response builders plus the header set applied to every response:
//! hardening headers, the open CORS policy, the `Server` name, and the fixed
//! proxy marker header.

use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderValue;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

pub const PROXY_MARKER_HEADER: &str = "x-proxy-response";

/// Build a JSON response, surfacing serialization failures to the caller so
/// the terminal error handler can convert them to an opaque 500.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<Response<Full<Bytes>>, serde_json::Error> {
    let json = serde_json::to_string(body)?;
    Ok(raw_json(status, json))
}

/// 404 for paths matching no route
pub fn endpoint_not_found(path: &str) -> Response<Full<Bytes>> {
    let body = json!({ "error": "Endpoint not found", "path": path });
    raw_json(StatusCode::NOT_FOUND, body.to_string())
}

/// 400 for malformed request bodies
pub fn bad_request(message: &str) -> Response<Full<Bytes>> {
    let body = json!({ "error": message });
    raw_json(StatusCode::BAD_REQUEST, body.to_string())
}

/// Opaque 500. Never carries internal failure detail.
pub fn internal_error() -> Response<Full<Bytes>> {
    raw_json(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":"Internal server error"}"#.to_string(),
    )
}

/// 429 with the retry window, plus a `Retry-After` header in seconds
pub fn too_many_requests(window: Duration, retry_after: Duration) -> Response<Full<Bytes>> {
    let body = json!({
        "error": "Too many requests",
        "retryAfter": format!("{} minutes", window.as_secs() / 60),
    });
    let mut response = raw_json(StatusCode::TOO_MANY_REQUESTS, body.to_string());
    if let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().to_string()) {
        response.headers_mut().insert("retry-after", value);
    }
    response
}

/// Answer a CORS preflight request under the open cross-origin policy
pub fn preflight() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Methods", "GET, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Add the headers every response carries, regardless of status
pub fn apply_common_headers(response: &mut Response<Full<Bytes>>, server_name: &str) {
    let headers = response.headers_mut();
    headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    headers.insert(
        "strict-transport-security",
        HeaderValue::from_static("max-age=15552000; includeSubDomains"),
    );
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(PROXY_MARKER_HEADER, HeaderValue::from_static("true"));
    if let Ok(value) = HeaderValue::from_str(server_name) {
        headers.insert("server", value);
    }
}

fn raw_json(status: StatusCode, json: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        })
}
