//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (common format plus resolved file and request time)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with variables

use chrono::Local;
use serde_json::json;

const TIME_LOCAL_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Access log entry describing one handled connection
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client address
    pub remote_addr: String,
    /// Time the connection was accepted
    pub time: chrono::DateTime<Local>,
    /// Raw GET line as received, if any
    pub request_line: Option<String>,
    /// Resolved file path, if the request named one
    pub file: Option<String>,
    /// Response status code
    pub status: u16,
    /// Bytes written to the client
    pub body_bytes: usize,
    /// Processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            request_line: None,
            file: None,
            status: 404,
            body_bytes: 0,
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => self.format_combined(),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    fn request(&self) -> &str {
        self.request_line.as_deref().unwrap_or("-")
    }

    #[allow(clippy::cast_precision_loss)]
    fn request_time_secs(&self) -> f64 {
        self.request_time_us as f64 / 1_000_000.0
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(TIME_LOCAL_FORMAT),
            self.request(),
            self.status,
            self.body_bytes,
        )
    }

    /// Common format followed by `"$file" $request_time`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" {:.3}",
            self.format_common(),
            self.file.as_deref().unwrap_or("-"),
            self.request_time_secs(),
        )
    }

    fn format_json(&self) -> String {
        json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "request": self.request_line,
            "file": self.file,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$remote_addr` - Client address
    /// - `$time_local` - Local time in Common Log Format
    /// - `$time_iso8601` - ISO 8601 timestamp
    /// - `$request` - Raw GET line
    /// - `$file` - Resolved file path
    /// - `$status` - Response status code
    /// - `$body_bytes_sent` - Bytes written
    /// - `$request_time` - Processing time in seconds (3 decimal places)
    fn format_custom(&self, pattern: &str) -> String {
        // $request_time must be replaced before $request
        pattern
            .replace("$remote_addr", &self.remote_addr)
            .replace(
                "$time_local",
                &self.time.format(TIME_LOCAL_FORMAT).to_string(),
            )
            .replace("$time_iso8601", &self.time.to_rfc3339())
            .replace("$request_time", &format!("{:.3}", self.request_time_secs()))
            .replace("$request", self.request())
            .replace("$file", self.file.as_deref().unwrap_or("-"))
            .replace("$status", &self.status.to_string())
            .replace("$body_bytes_sent", &self.body_bytes.to_string())
    }
}
