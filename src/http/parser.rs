use bytes::Bytes;

use crate::http::request::{Method, Request};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty request line")]
    Empty,
    #[error("request line has no path")]
    MissingPath,
    #[error("request line has {0} tokens, expected at most 3")]
    TooManyTokens(usize),
    #[error("request line is not valid UTF-8")]
    InvalidEncoding,
}

/// Parses the head of an HTTP request.
///
/// Only the request line can fail; the header block is best-effort. A
/// missing `\r\n\r\n` terminator is fine, headers are taken from whatever
/// bytes are there.
pub fn parse_request(raw: Bytes) -> Result<Request, ParseError> {
    let head = match find_headers_end(&raw) {
        Some(end) => &raw[..end],
        None => &raw[..],
    };

    let mut lines = head.split(|&b| b == b'\n').map(strip_cr);

    // Request line
    let request_line = lines.next().unwrap_or_default();
    let request_line = std::str::from_utf8(request_line).map_err(|_| ParseError::InvalidEncoding)?;

    let tokens: Vec<&str> = request_line.split_ascii_whitespace().collect();
    let (method, path, version) = match tokens.as_slice() {
        [] => return Err(ParseError::Empty),
        [_] => return Err(ParseError::MissingPath),
        [method, path] => (*method, *path, None),
        [method, path, version] => (*method, *path, Some(version.to_string())),
        _ => return Err(ParseError::TooManyTokens(tokens.len())),
    };

    // Headers
    let mut headers = Vec::new();

    for line in lines {
        if line.is_empty() {
            break;
        }

        let line = String::from_utf8_lossy(line);
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };

        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        headers.push((name.to_string(), value.trim().to_string()));
    }

    let request = Request {
        method: Method::parse(method),
        path: path.to_string(),
        version,
        headers,
        raw: raw.clone(),
    };

    Ok(request)
}

/// Offset of the `\r\n\r\n` that ends the header block.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
