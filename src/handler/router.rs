//! Route dispatch
//!
//! Matches the request path segment-by-segment (exact, case-sensitive) and
//! calls the corresponding endpoint. Segments are percent-decoded after
//! splitting, so an encoded slash stays inside its parameter instead of
//! creating a new one. Anything that matches no route gets the 404 fallback;
//! any error escaping an endpoint is logged server-side and converted to an
//! opaque 500 so no internal detail reaches the client.

use super::endpoints;
use crate::data::ReferenceData;
use crate::logger;
use crate::response;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};

pub fn dispatch(method: &Method, path: &str, data: &ReferenceData) -> Response<Full<Bytes>> {
    if *method != Method::GET {
        return response::endpoint_not_found(path);
    }

    let mut decoded = Vec::new();
    for raw in path.split('/').filter(|s| !s.is_empty()) {
        match decode_segment(raw) {
            Some(segment) => decoded.push(segment),
            None => return response::bad_request("Malformed URL path"),
        }
    }

    let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();
    let result = match segments.as_slice() {
        [] => endpoints::health(data),
        ["states"] => endpoints::states(data),
        ["case-types"] => endpoints::case_types(),
        ["injury-types"] => endpoints::injury_types(),
        ["statute-of-limitations", state, case_type] => {
            endpoints::statute(data, state, case_type)
        }
        ["statute-of-limitations", state] => endpoints::state_statutes(data, state),
        ["average-settlement", injury_type] => endpoints::settlement(data, injury_type),
        ["average-settlements"] => endpoints::settlements(data),
        _ => return response::endpoint_not_found(path),
    };

    result.unwrap_or_else(|err| {
        logger::log_error(&format!("Handler failure on {path}: {err}"));
        response::internal_error()
    })
}

/// Percent-decode one path segment. Returns `None` for truncated or
/// non-hex escape sequences and for decoded bytes that are not valid UTF-8.
/// `+` is left alone; it only means space in query strings.
fn decode_segment(segment: &str) -> Option<String> {
    if !segment.contains('%') {
        return Some(segment.to_string());
    }

    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_digit(*bytes.get(i + 1)?)?;
            let lo = hex_digit(*bytes.get(i + 2)?)?;
            out.push(hi << 4 | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
