use std::borrow::Cow;

/// HTTP status codes the server emits.
///
/// - `Ok` (200): Request successful
/// - `BadRequest` (400): A route argument is missing or invalid
/// - `NotFound` (404): No such route, file or header
/// - `InternalServerError` (500): Server-side I/O failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Formats as `<code> <reason>`, the tail of a status line.
impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Value of the Content-Type header.
///
/// Textual responses name only the subtype (`Text("html")` becomes
/// `text/html`); file responses carry a full MIME type from the MIME table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text(&'static str),
    Mime(&'static str),
}

impl ContentType {
    pub const HTML: ContentType = ContentType::Text("html");
    pub const PLAIN: ContentType = ContentType::Text("plain");

    pub fn header_value(&self) -> Cow<'static, str> {
        match self {
            ContentType::Text(subtype) => Cow::Owned(format!("text/{subtype}")),
            ContentType::Mime(mime) => Cow::Borrowed(mime),
        }
    }
}

/// A complete HTTP response ready to be framed and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    /// Headers in the order they are written
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .content_type(ContentType::PLAIN)
///     .body(b"hi".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Sets a header, replacing an earlier one with the same name
    /// (compared case-insensitively) in place.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, key.into(), value.into());
        self
    }

    pub fn content_type(self, content_type: ContentType) -> Self {
        self.header("Content-Type", content_type.header_value())
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the final Response.
    ///
    /// Content-Length is always recomputed from the body and
    /// `Connection: close` is always present.
    pub fn build(mut self) -> Response {
        let length = self.body.len().to_string();
        set_header(&mut self.headers, "Content-Length".to_string(), length);
        set_header(&mut self.headers, "Connection".to_string(), "close".to_string());

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

fn set_header(headers: &mut Vec<(String, String)>, key: String, value: String) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
        Some(slot) => slot.1 = value,
        None => headers.push((key, value)),
    }
}

impl Response {
    /// Status, content type and body in one call.
    pub fn build(status: StatusCode, content_type: ContentType, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(status)
            .content_type(content_type)
            .body(body)
            .build()
    }

    pub fn html(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self::build(status, ContentType::HTML, body)
    }

    pub fn plain(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self::build(status, ContentType::PLAIN, body)
    }

    pub fn not_found() -> Self {
        Self::html(StatusCode::NotFound, "<html>Not Found</html>")
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}
