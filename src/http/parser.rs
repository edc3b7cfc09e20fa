use std::fmt;

use crate::config::{PATH_BUFFER_SIZE, RECV_BUFFER_SIZE};
use crate::http::request::{ConnectionHeader, Headers, Method, Request, RequestLine, Version};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown or empty method token.
    InvalidMethod,
    /// Empty URI, URI not followed by a version, or URI not UTF-8.
    InvalidUri,
    /// The request line did not fit the receive buffer, or the URI exceeds
    /// `PATH_BUFFER_SIZE`.
    UriTooLong,
    /// Unknown or empty version token.
    InvalidVersion,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::InvalidMethod => "invalid request method",
            ParseError::InvalidUri => "invalid request uri",
            ParseError::UriTooLong => "request uri too long",
            ParseError::InvalidVersion => "invalid http version",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

/// Parses one request from the front of `buf`.
///
/// On success also returns how many bytes the request occupied: up to and
/// including the blank line that ends the headers, or all of `buf` when no
/// blank line has arrived. Only the first `RECV_BUFFER_SIZE` bytes are looked at.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let buf = &buf[..buf.len().min(RECV_BUFFER_SIZE)];

    let line_end = find_crlf(buf).ok_or(ParseError::UriTooLong)?;
    let line = parse_request_line(&buf[..line_end])?;
    let (headers, consumed) = scan_headers(buf, line_end + 2);

    Ok((Request { line, headers }, consumed))
}

/// Whether `buf` holds a complete, CRLF-terminated request line.
pub fn request_line_ready(buf: &[u8]) -> bool {
    find_crlf(buf).is_some()
}

/// Whether `buf` holds a request line and its whole header block, up to the
/// blank line.
pub fn headers_complete(buf: &[u8]) -> bool {
    buf.windows(4).any(|w| w == b"\r\n\r\n")
}

fn parse_request_line(line: &[u8]) -> Result<RequestLine, ParseError> {
    let (token, rest) = next_token(line);
    let method = Method::from_bytes(token).ok_or(ParseError::InvalidMethod)?;

    let (token, rest) = next_token(rest);
    if token.is_empty() {
        return Err(ParseError::InvalidUri);
    }
    if token.len() > PATH_BUFFER_SIZE {
        return Err(ParseError::UriTooLong);
    }
    if rest.iter().all(|&b| is_whitespace(b)) {
        return Err(ParseError::InvalidUri);
    }
    let uri = std::str::from_utf8(token)
        .map_err(|_| ParseError::InvalidUri)?
        .to_owned();

    let (token, _) = next_token(rest);
    let version = Version::from_bytes(token).ok_or(ParseError::InvalidVersion)?;

    Ok(RequestLine {
        method,
        version,
        uri,
    })
}

/// Walks the header lines starting at `pos`, picking out `Connection`.
fn scan_headers(buf: &[u8], mut pos: usize) -> (Headers, usize) {
    let mut headers = Headers::default();

    loop {
        let Some(len) = find_crlf(&buf[pos..]) else {
            return (headers, buf.len());
        };
        if len == 0 {
            return (headers, pos + 2);
        }

        if let Some(connection) = parse_connection(&buf[pos..pos + len]) {
            headers.connection = connection;
        }
        pos += len + 2;
    }
}

fn parse_connection(line: &[u8]) -> Option<ConnectionHeader> {
    const NAME: &[u8] = b"connection:";

    let name = line.get(..NAME.len())?;
    if !name.eq_ignore_ascii_case(NAME) {
        return None;
    }

    let value = line[NAME.len()..].trim_ascii();
    if value.eq_ignore_ascii_case(b"keep-alive") {
        Some(ConnectionHeader::KeepAlive)
    } else if value.eq_ignore_ascii_case(b"close") {
        Some(ConnectionHeader::Close)
    } else {
        None
    }
}

/// Skips leading whitespace and splits off the following token.
fn next_token(line: &[u8]) -> (&[u8], &[u8]) {
    let start = line
        .iter()
        .position(|&b| !is_whitespace(b))
        .unwrap_or(line.len());
    let line = &line[start..];
    let end = line
        .iter()
        .position(|&b| is_whitespace(b))
        .unwrap_or(line.len());
    line.split_at(end)
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r')
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}
