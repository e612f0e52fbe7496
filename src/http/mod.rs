//! HTTP protocol layer module
//!
//! Request line parsing and response serialization, decoupled from socket I/O.

pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::{find_get_line, parse_request_path, ParseError};
pub use response::{build_response, status_code};
