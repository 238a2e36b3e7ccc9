use bytes::Bytes;

/// HTTP request methods.
///
/// Routing is method-agnostic: every method is accepted and recorded, and
/// anything outside the common set is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// Any other token found in method position
    Other(String),
}

impl Method {
    /// Parses a method token. Matching is case-sensitive, as in HTTP.
    ///
    /// ```
    /// # use courier::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("get"), Method::Other("get".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed HTTP request.
///
/// Built once from the bytes read off a connection and never modified
/// afterwards.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Raw request target, query string included (e.g. "/echo/abc?x=1")
    pub path: String,
    /// Third request-line token, when the client sent one
    pub version: Option<String>,
    /// Headers in the order they were received
    pub headers: Vec<(String, String)>,
    /// The bytes the request was parsed from
    pub raw: Bytes,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    headers: Vec<(String, String)>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            headers: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let method = self.method.ok_or("method missing")?;
        let path = self.path.ok_or("path missing")?;
        if path.is_empty() {
            return Err("path empty");
        }
        Ok(Request {
            method,
            path,
            version: self.version,
            headers: self.headers,
            raw: Bytes::new(),
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Retrieves a header value by name, ignoring ASCII case.
    ///
    /// When a header repeats, the first occurrence wins.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// The `User-Agent` header, if present and non-empty.
    pub fn user_agent(&self) -> Option<&str> {
        self.header("User-Agent").filter(|v| !v.is_empty())
    }
}
