//! Request dispatch module
//!
//! Entry point for request processing: parse the GET line, resolve and check
//! the file, and build the reply.

use std::path::{Path, PathBuf};

use crate::handler::files;
use crate::http::{self, ParseError};

/// Everything decided about one request before anything is written back
#[derive(Debug)]
pub struct RequestOutcome {
    /// Raw GET line, if the request had one
    pub request_line: Option<String>,
    /// Resolved absolute path, or why none could be extracted
    pub path: Result<PathBuf, ParseError>,
    /// Whether the resolved path is an existing regular file
    pub found: bool,
    /// Serialized response bytes
    pub response: Vec<u8>,
}

impl RequestOutcome {
    pub const fn status(&self) -> u16 {
        http::status_code(self.found)
    }

    /// Path to hand to the player once the response is written
    pub fn launch_path(&self) -> Option<&Path> {
        match &self.path {
            Ok(path) if self.found => Some(path.as_path()),
            _ => None,
        }
    }
}

/// Main entry point for request handling
///
/// Malformed requests are answered exactly like a missing file.
pub async fn handle_request(data: &[u8]) -> RequestOutcome {
    let text = String::from_utf8_lossy(data);
    let request_line = http::find_get_line(&text).map(ToString::to_string);

    let path = match http::parse_request_path(&text) {
        Ok(raw) => Ok(files::resolve_path(&raw).await),
        Err(e) => Err(e),
    };

    let found = match &path {
        Ok(p) => files::is_regular_file(p).await,
        Err(_) => false,
    };

    RequestOutcome {
        request_line,
        path,
        found,
        response: http::build_response(found),
    }
}
