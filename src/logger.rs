//! Logging
//!
//! Startup and error logging via plain println helpers, plus structured
//! access-log entries written once per request with the final response
//! status. Supported access-log formats: `combined` (Apache/Nginx combined
//! format, minus the identity fields this service never sees) and `json`.

use crate::config::Config;
use crate::data::ReferenceData;
use chrono::Local;
use std::net::SocketAddr;

pub fn log_server_start(addr: &SocketAddr, config: &Config, data: &ReferenceData) {
    println!("======================================");
    println!("Legal Data API running on port {}", addr.port());
    println!("Listening on: http://{addr}");
    println!("Data version: {}", data.data_version());
    println!("Jurisdictions loaded: {}", data.jurisdictions().len());
    println!("Settlement entries loaded: {}", data.settlements().len());
    println!(
        "Rate limit: {} requests / {}s window",
        config.rate_limit.max_requests, config.rate_limit.window_secs
    );
    println!("======================================\n");
}

pub fn log_error(message: &str) {
    eprintln!("[Error] {message}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[Error] Failed to serve connection: {err:?}");
}

/// One access-log line per request, emitted after the response is final so
/// rate-limit rejections and error conversions are recorded with their real
/// status.
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub status: u16,
    pub body_bytes: u64,
    pub request_time_us: u64,
}

impl AccessLogEntry {
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            status: 200,
            body_bytes: 0,
            request_time_us: 0,
        }
    }

    pub fn format(&self, format: &str) -> String {
        match format {
            "json" => self.format_json(),
            _ => self.format_combined(),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_combined(&self) -> String {
        format!(
            "{} - - [{}] \"{} {}{} HTTP/1.1\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.query
                .as_ref()
                .map(|q| format!("?{q}"))
                .unwrap_or_default(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        let query_json = self
            .query
            .as_ref()
            .map_or_else(|| "null".to_string(), |q| format!("\"{}\"", escape_json(q)));

        format!(
            r#"{{"remote_addr":"{}","time":"{}","method":"{}","path":"{}","query":{},"status":{},"body_bytes":{},"request_time_us":{}}}"#,
            escape_json(&self.remote_addr),
            self.time.to_rfc3339(),
            escape_json(&self.method),
            escape_json(&self.path),
            query_json,
            self.status,
            self.body_bytes,
            self.request_time_us,
        )
    }

    pub fn write(&self, format: &str) {
        println!("{}", self.format(format));
    }
}

/// Escape special characters for JSON string
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "192.168.1.1".to_string(),
            "GET".to_string(),
            "/states".to_string(),
        );
        entry.status = 200;
        entry.body_bytes = 512;
        entry.request_time_us = 120;
        entry
    }

    #[test]
    fn test_format_combined() {
        let log = create_test_entry().format("combined");
        assert!(log.contains("192.168.1.1"));
        assert!(log.contains("GET /states HTTP/1.1"));
        assert!(log.contains("200 512"));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().format("json");
        assert!(log.contains(r#""remote_addr":"192.168.1.1""#));
        assert!(log.contains(r#""path":"/states""#));
        assert!(log.contains(r#""status":200"#));
        assert!(log.contains(r#""query":null"#));
    }

    #[test]
    fn test_unknown_format_falls_back_to_combined() {
        let mut entry = create_test_entry();
        entry.query = Some("page=1".to_string());
        let log = entry.format("fancy");
        assert!(log.contains("GET /states?page=1 HTTP/1.1"));
    }
}
