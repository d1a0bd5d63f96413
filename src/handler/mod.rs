//! Request pipeline
//!
//! Every inbound request passes through a fixed sequence before routing:
//! CORS preflight answering, JSON body parsing, and rate limiting. The
//! common header set is applied to whatever response comes out, and the
//! access log line is written last so it records the final status —
//! including rate-limit rejections and error conversions that never reached
//! an endpoint.

pub mod endpoints;
pub mod router;

use crate::logger;
use crate::ratelimit::Decision;
use crate::response;
use crate::AppState;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

/// Entry point for one HTTP request.
pub async fn handle_request<B>(
    req: Request<B>,
    remote_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);

    let mut response = process(req, remote_addr.ip(), &state).await;
    response::apply_common_headers(&mut response, &state.config.http.server_name);

    if state.config.logging.access_log {
        let mut entry = logger::AccessLogEntry::new(remote_addr.ip().to_string(), method, path);
        entry.query = query;
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        entry.write(&state.config.logging.format);
    }

    Ok(response)
}

async fn process<B>(req: Request<B>, client: IpAddr, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    // Open cross-origin policy: answer preflight for any origin
    if method == Method::OPTIONS {
        return response::preflight();
    }

    // Parse JSON bodies when present. An absent body passes through; a
    // malformed JSON body is rejected before routing.
    let is_json = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().starts_with("application/json"));

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            logger::log_error(&format!("Failed to read request body: {err}"));
            return response::bad_request("Failed to read request body");
        }
    };
    if is_json
        && !body.is_empty()
        && serde_json::from_slice::<serde_json::Value>(&body).is_err()
    {
        return response::bad_request("Invalid JSON body");
    }

    // Rate limit before the router so rejected requests never reach handlers
    if let Decision::Limited { retry_after } = state.limiter.check(client) {
        return response::too_many_requests(state.limiter.window(), retry_after);
    }

    router::dispatch(&method, &path, &state.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::ReferenceData;
    use crate::ratelimit::RateLimiter;
    use hyper::StatusCode;
    use std::time::Duration;

    const STATUTES: &str = r#"{
        "metadata": { "version": "2024.1" },
        "jurisdictions": {
            "CA": {
                "name": "California",
                "caseTypes": { "personal-injury": { "years": 2 } }
            }
        }
    }"#;

    const SETTLEMENTS: &str = r#"{ "slip-and-fall": { "averageAmount": 45000 } }"#;

    fn test_state(max_requests: u32) -> Arc<AppState> {
        Arc::new(AppState {
            config: Config::load().unwrap(),
            data: ReferenceData::from_strs(STATUTES, SETTLEMENTS).unwrap(),
            limiter: RateLimiter::new(Duration::from_secs(900), max_requests),
        })
    }

    fn get(path: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:55000".parse().unwrap()
    }

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_every_response_carries_common_headers() {
        let state = test_state(100);
        let response = handle_request(get("/states"), peer(), state).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers[response::PROXY_MARKER_HEADER], "true");
    }

    #[tokio::test]
    async fn test_unknown_route_returns_404_with_path() {
        let state = test_state(100);
        let response = handle_request(get("/nonexistent"), peer(), state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Endpoint not found");
        assert_eq!(body["path"], "/nonexistent");
    }

    #[tokio::test]
    async fn test_rate_limit_short_circuits_any_endpoint() {
        let state = test_state(2);
        for _ in 0..2 {
            let response = handle_request(get("/states"), peer(), Arc::clone(&state))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        // Third request trips the limit regardless of the target route
        let response = handle_request(get("/case-types"), peer(), state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Too many requests");
        assert!(body["retryAfter"].is_string());
    }

    #[tokio::test]
    async fn test_rate_limited_responses_still_carry_headers() {
        let state = test_state(0);
        let response = handle_request(get("/"), peer(), state).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[response::PROXY_MARKER_HEADER], "true");
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_rejected() {
        let state = test_state(100);
        let req = Request::builder()
            .method(Method::GET)
            .uri("/states")
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from_static(b"{ not json")))
            .unwrap();
        let response = handle_request(req, peer(), state).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_absent_body_with_json_content_type_passes() {
        let state = test_state(100);
        let req = Request::builder()
            .method(Method::GET)
            .uri("/states")
            .header("content-type", "application/json")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handle_request(req, peer(), state).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_preflight_is_answered() {
        let state = test_state(100);
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/states")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handle_request(req, peer(), state).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_non_get_method_falls_through_to_not_found() {
        let state = test_state(100);
        let req = Request::builder()
            .method(Method::POST)
            .uri("/states")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handle_request(req, peer(), state).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
