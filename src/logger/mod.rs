//! Logger module
//!
//! Provides logging utilities for the player server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Player launch reporting
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_starting() {
    write_info("Starting server...");
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info(&format!("Server running on {}", config.bind_address()));
    write_info(&format!("Listening on: {addr}"));
    write_info(&format!("Read limit: {} bytes", config.http.max_request_size));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_player_configured(configured: &str, resolved: &str) {
    if configured == resolved {
        write_info(&format!("Player command: {resolved}"));
    } else {
        write_info(&format!("Player command: {resolved} (configured as '{configured}')"));
    }
}

pub fn log_signal(name: &str) {
    write_info(&format!("\n[SIGNAL] {name} received, stopping server"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(peer_addr: &SocketAddr, err: &std::io::Error) {
    write_error(&format!("[ERROR] Connection {peer_addr}: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_player_running(command: &str) {
    write_info(&format!("Running: <{command}>"));
}

pub fn log_player_done(command: &str, exit_code: Option<i32>) {
    match exit_code {
        Some(code) => write_info(&format!("Done: <{command} exited with {code}>")),
        None => write_info(&format!("Done: <{command} terminated by signal>")),
    }
}

/// Log captured child output under a `[stdout]`/`[stderr]` heading
pub fn log_player_output(stream: &str, output: &str) {
    if !output.is_empty() {
        write_info(&format!("[{stream}]\n{output}"));
    }
}

pub fn log_shutdown() {
    write_info("\nExiting");
}
