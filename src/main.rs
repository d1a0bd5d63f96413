use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

mod catalog;
mod config;
mod data;
mod handler;
mod logger;
mod ratelimit;
mod response;

const DATA_DIR: &str = "data";

/// Shared application state: constructed once at startup, immutable
/// afterwards except for the rate limiter's internal counters.
pub struct AppState {
    pub config: config::Config,
    pub data: data::ReferenceData,
    pub limiter: ratelimit::RateLimiter,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    // Reference data must load before the listener binds; a missing or
    // malformed document aborts startup.
    let reference = data::ReferenceData::load(Path::new(DATA_DIR))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main(cfg, reference))
}

async fn async_main(
    cfg: config::Config,
    reference: data::ReferenceData,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;

    let limiter = ratelimit::RateLimiter::new(
        Duration::from_secs(cfg.rate_limit.window_secs),
        cfg.rate_limit.max_requests,
    );
    let state = Arc::new(AppState {
        data: reference,
        limiter,
        config: cfg,
    });

    logger::log_server_start(&addr, &state.config, &state.data);

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
                continue;
            }
        };

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| {
                handler::handle_request(req, peer_addr, Arc::clone(&state))
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                logger::log_connection_error(&err);
            }
        });
    }
}
