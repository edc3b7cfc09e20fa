use std::fmt;

/// HTTP request methods.
///
/// Every method in the table is recognized by the parser, but only `GET` and
/// `HEAD` are served; the rest are answered with 405 Method Not Allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    OPTIONS,
    TRACE,
    PUT,
    DELETE,
    POST,
    PATCH,
    CONNECT,
}

impl Method {
    pub const ALL: [Method; 9] = [
        Method::GET,
        Method::HEAD,
        Method::OPTIONS,
        Method::TRACE,
        Method::PUT,
        Method::DELETE,
        Method::POST,
        Method::PATCH,
        Method::CONNECT,
    ];

    /// Parses a method token. Matching is exact and case-sensitive.
    ///
    /// ```
    /// # use staticd::http::request::Method;
    /// assert_eq!(Method::from_bytes(b"GET"), Some(Method::GET));
    /// assert_eq!(Method::from_bytes(b"get"), None);
    /// ```
    pub fn from_bytes(token: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().as_bytes() == token)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::POST => "POST",
            Method::PATCH => "PATCH",
            Method::CONNECT => "CONNECT",
        }
    }

    /// Whether the server answers this method with a file.
    pub fn is_served(&self) -> bool {
        matches!(self, Method::GET | Method::HEAD)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol versions recognized on the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
    /// Recognized so it can be rejected with 505.
    Http20,
}

impl Version {
    pub const ALL: [Version; 3] = [Version::Http10, Version::Http11, Version::Http20];

    pub fn from_bytes(token: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|version| version.as_str().as_bytes() == token)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
            Version::Http20 => "HTTP/2.0",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Version::Http20)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the `Connection` request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionHeader {
    /// No recognizable `Connection` header was sent. Treated as `Close`.
    #[default]
    Unset,
    KeepAlive,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub version: Version,
    /// Never longer than `PATH_BUFFER_SIZE`.
    pub uri: String,
}

/// The only header the server interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Headers {
    pub connection: ConnectionHeader,
}

/// A parsed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub line: RequestLine,
    pub headers: Headers,
}

impl Request {
    /// Whether the client asked for the connection to stay open.
    ///
    /// An absent header means close, for HTTP/1.1 too.
    pub fn keep_alive(&self) -> bool {
        self.headers.connection == ConnectionHeader::KeepAlive
    }
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Method,
    version: Version,
    uri: String,
    connection: ConnectionHeader,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            version: Version::Http11,
            uri: "/".to_string(),
            connection: ConnectionHeader::Unset,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn connection(mut self, connection: ConnectionHeader) -> Self {
        self.connection = connection;
        self
    }

    pub fn build(self) -> Request {
        Request {
            line: RequestLine {
                method: self.method,
                version: self.version,
                uri: self.uri,
            },
            headers: Headers {
                connection: self.connection,
            },
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
