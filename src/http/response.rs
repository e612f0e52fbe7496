//! HTTP response building module
//!
//! Serializes the status reply sent back for every request. The status line
//! carries the literal `HTTP/2` token and lines are joined with a bare `\n`;
//! existing clients match on those bytes.

use std::io;

use chrono::Utc;
use serde::Serialize;
use serde_json::ser::Formatter;

/// RFC 1123 date as used by the HTTP `Date` header
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// JSON body of every response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBody {
    /// 1 when the file was found, 0 otherwise
    pub status: u8,
}

/// Compact JSON with `", "` and `": "` separators: `{"status": 1}`
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn to_spaced_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

/// Current time formatted for the `Date` header
pub fn http_date() -> String {
    Utc::now().format(HTTP_DATE_FORMAT).to_string()
}

/// Status code for a lookup result
pub const fn status_code(found: bool) -> u16 {
    if found {
        200
    } else {
        404
    }
}

/// Build the full response for a lookup result
///
/// `200` with `{"status": 1}` when the file exists, `404` with
/// `{"status": 0}` otherwise.
pub fn build_response(found: bool) -> Vec<u8> {
    build_response_at(found, &http_date())
}

/// Build the response with an explicit `Date` header value
pub fn build_response_at(found: bool, date: &str) -> Vec<u8> {
    let body = StatusBody {
        status: u8::from(found),
    };

    let headers = [
        format!("HTTP/2 {}", status_code(found)),
        "Content-Type: application/json".to_string(),
        format!("Date: {date}"),
        "Connection: close".to_string(),
    ];

    let mut response = headers.join("\n").into_bytes();
    response.extend_from_slice(b"\n\n");
    match to_spaced_json(&body) {
        Ok(json) => response.extend_from_slice(&json),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response body: {e}"));
            response.extend_from_slice(format!("{{\"status\": {}}}", body.status).as_bytes());
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE: &str = "Sun, 06 Nov 1994 08:49:37 GMT";

    #[test]
    fn test_found_response() {
        let response = String::from_utf8(build_response_at(true, DATE)).unwrap();
        assert_eq!(
            response,
            "HTTP/2 200\nContent-Type: application/json\nDate: Sun, 06 Nov 1994 08:49:37 GMT\nConnection: close\n\n{\"status\": 1}"
        );
    }

    #[test]
    fn test_not_found_response() {
        let response = String::from_utf8(build_response_at(false, DATE)).unwrap();
        assert!(response.starts_with("HTTP/2 404\n"));
        assert!(response.ends_with("\n\n{\"status\": 0}"));
        assert!(!response.contains('\r'));
    }

    #[test]
    fn test_spaced_json_separators() {
        #[derive(Serialize)]
        struct Pair {
            a: u8,
            b: Vec<u8>,
        }
        let json = to_spaced_json(&Pair { a: 1, b: vec![2, 3] }).unwrap();
        assert_eq!(String::from_utf8(json).unwrap(), "{\"a\": 1, \"b\": [2, 3]}");
    }

    #[test]
    fn test_http_date_shape() {
        let date = http_date();
        assert!(date.ends_with(" GMT"));
        assert!(chrono::NaiveDateTime::parse_from_str(&date, HTTP_DATE_FORMAT).is_ok());
    }

    #[test]
    fn test_date_header_present() {
        let response = String::from_utf8(build_response(false)).unwrap();
        let date_line = response.lines().nth(2).unwrap();
        assert!(date_line.starts_with("Date: "));
    }
}
