use crate::http::request::{Method, Request};
use std::collections::HashMap;

const HEADERS_END: &[u8] = b"\r\n\r\n";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("request line is not `METHOD PATH VERSION`")]
    InvalidRequest,
    #[error("header line is not `Name: Value`")]
    InvalidHeader,
    #[error("Content-Length is not a number")]
    InvalidContentLength,
    #[error("request head is not valid UTF-8")]
    InvalidEncoding,
    #[error("request is incomplete")]
    Incomplete,
    #[error("request exceeds {0} bytes")]
    TooLarge(usize),
}

/// Parses one request from the front of `buf`.
///
/// Returns the request and the number of bytes it occupied, or
/// [`ParseError::Incomplete`] when more bytes are needed: the blank line
/// after the headers has not arrived yet, or fewer than `Content-Length`
/// body bytes are buffered. Without a `Content-Length` header the body is
/// everything after the blank line.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + HEADERS_END.len()..];

    let headers_str =
        std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidEncoding)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let parts: Vec<&str> = request_line.split(' ').collect();
    let [method_str, path, version] = parts[..] else {
        return Err(ParseError::InvalidRequest);
    };

    let method = Method::from(method_str);

    // Headers
    let mut headers: HashMap<String, Vec<String>> = HashMap::new();

    for line in lines {
        if line.is_empty() {
            break;
        }

        let parts: Vec<&str> = line.split(": ").collect();
        let [key, value] = parts[..] else {
            return Err(ParseError::InvalidHeader);
        };

        headers
            .entry(key.to_string())
            .or_default()
            .extend(value.split(", ").map(str::to_string));
    }

    // Body
    let content_length = headers
        .get("Content-Length")
        .and_then(|values| values.first())
        .map(|v| v.parse::<usize>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()?;

    let body_len = match content_length {
        Some(len) if body_bytes.len() < len => return Err(ParseError::Incomplete),
        Some(len) => len,
        None => body_bytes.len(),
    };

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        route_params: HashMap::new(),
        body: body_bytes[..body_len].to_vec(),
    };

    let total_consumed = headers_end + HEADERS_END.len() + body_len;
    Ok((request, total_consumed))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADERS_END.len()).position(|w| w == HEADERS_END)
}
