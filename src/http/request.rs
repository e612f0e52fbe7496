//! Request line parsing module
//!
//! Extracts the requested file path from raw request text. Kept free of
//! socket I/O so it can be exercised directly.

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Reasons a request does not name a usable path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no GET line in request")]
    NoGetLine,
    #[error("percent-decoded path is not valid UTF-8")]
    InvalidEncoding,
    #[error("request names an empty path")]
    EmptyPath,
}

/// Return the first line starting with `GET`, without its line terminator
pub fn find_get_line(text: &str) -> Option<&str> {
    text.split('\n')
        .find(|line| line.starts_with("GET"))
        .map(|line| line.trim_end_matches('\r'))
}

/// Parse the requested path out of raw request text
///
/// The first line starting with `GET` is used. Every `GET ` and ` HTTP/1.1`
/// marker is removed, the rest is percent-decoded and trimmed.
///
/// # Examples
/// ```ignore
/// let path = parse_request_path("GET /tmp/a%20b.mp4 HTTP/1.1\r\n\r\n");
/// assert_eq!(path.unwrap(), "/tmp/a b.mp4");
/// ```
pub fn parse_request_path(text: &str) -> Result<String, ParseError> {
    let line = find_get_line(text).ok_or(ParseError::NoGetLine)?;
    let target = line.replace("GET ", "").replace(" HTTP/1.1", "");

    let decoded = percent_decode_str(&target)
        .decode_utf8()
        .map_err(|_| ParseError::InvalidEncoding)?;

    let path = decoded.trim();
    if path.is_empty() {
        return Err(ParseError::EmptyPath);
    }
    Ok(path.to_string())
}
