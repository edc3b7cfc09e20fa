use bytes::Bytes;
use tokio::fs::File;
use tracing::{debug, warn};

use crate::config::Config;
use crate::http::file::{FileBody, FileMeta};
use crate::http::mime::content_type;
use crate::http::parser::ParseError;
use crate::http::path;
use crate::http::request::{Method, Request, Version};
use crate::http::writer::serialize_head;

/// HTTP status codes the server produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 414 URI Too Long
    UriTooLong,
    /// 500 Internal Server Error
    InternalServerError,
    /// 505 HTTP Version Not Supported
    HttpVersionNotSupported,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use staticd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::UriTooLong.as_u16(), 414);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::UriTooLong => 414,
            StatusCode::InternalServerError => 500,
            StatusCode::HttpVersionNotSupported => 505,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::UriTooLong => "URI Too Long",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }
}

impl From<ParseError> for StatusCode {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::InvalidVersion => StatusCode::HttpVersionNotSupported,
            ParseError::UriTooLong => StatusCode::UriTooLong,
            ParseError::InvalidMethod | ParseError::InvalidUri => StatusCode::BadRequest,
        }
    }
}

/// A response ready to be written: serialized head plus, for a successful
/// `GET`, the file to stream after it.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    /// Whether the connection stays open after this response.
    pub keep_alive: bool,
    /// Status line and headers, terminated by an empty line.
    pub head: Bytes,
    pub body: Option<FileBody>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .version(Version::Http10)
///     .header("Content-Type", "text/plain")
///     .build(&cfg);
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    version: Version,
    keep_alive: bool,
    headers: Vec<(&'static str, String)>,
    body: Option<FileBody>,
}

impl ResponseBuilder {
    /// Starts an `HTTP/1.1` response that closes the connection.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: Version::Http11,
            keep_alive: false,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn header(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((key, value.into()));
        self
    }

    pub fn body(mut self, body: FileBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the final Response.
    ///
    /// Adds `Server` and the connection headers, and `Content-Length: 0` when
    /// no length was given.
    pub fn build(self, cfg: &Config) -> Response {
        let mut headers = Vec::with_capacity(self.headers.len() + 4);
        headers.push(("Server", cfg.server_name.clone()));
        headers.extend(self.headers);

        if !headers.iter().any(|(k, _)| *k == "Content-Length") {
            headers.push(("Content-Length", "0".to_string()));
        }

        if self.keep_alive {
            headers.push(("Connection", "keep-alive".to_string()));
            headers.push((
                "Keep-Alive",
                format!(
                    "timeout={}, max={}",
                    cfg.keep_alive_timeout, cfg.keep_alive_max
                ),
            ));
        } else {
            headers.push(("Connection", "close".to_string()));
        }

        Response {
            status: self.status,
            keep_alive: self.keep_alive,
            head: serialize_head(self.status, self.version, &headers),
            body: self.body,
        }
    }
}

impl Response {
    /// Decides the response for one parse outcome.
    ///
    /// Checks run in a fixed order and the first failing one picks the
    /// status: version, parse error, method, path length, file lookup,
    /// content type. Errors are always answered, never propagated.
    pub async fn for_request(parsed: Result<&Request, ParseError>, cfg: &Config) -> Response {
        let request = match parsed {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "rejecting unparsable request");
                return ResponseBuilder::new(e.into()).build(cfg);
            }
        };

        let version = request.line.version;
        if !version.is_supported() {
            return ResponseBuilder::new(StatusCode::HttpVersionNotSupported).build(cfg);
        }

        let reply = |status| {
            ResponseBuilder::new(status)
                .version(version)
                .keep_alive(request.keep_alive())
        };

        let method = request.line.method;
        if !method.is_served() {
            return reply(StatusCode::MethodNotAllowed).build(cfg);
        }

        let path = match path::resolve(&request.line.uri, &cfg.root_dir) {
            Ok(path) => path,
            Err(e) => {
                warn!(uri = %request.line.uri, error = %e, "cannot map uri to a path");
                return reply(StatusCode::InternalServerError).build(cfg);
            }
        };

        let length = match FileMeta::query(&path).await {
            FileMeta::Found(length) => length,
            meta => {
                debug!(path = %path, ?meta, "file lookup failed");
                return reply(meta.error_status()).build(cfg);
            }
        };

        let file = if method == Method::GET {
            match File::open(&path).await {
                Ok(file) => Some(file),
                Err(e) => {
                    debug!(path = %path, error = %e, "cannot open file");
                    return reply(FileMeta::from_error(&e).error_status()).build(cfg);
                }
            }
        } else {
            None
        };

        let mime = content_type(&path);
        if mime.is_empty() {
            return reply(StatusCode::BadRequest).build(cfg);
        }

        let mut builder = reply(StatusCode::Ok)
            .header("Content-Type", mime)
            .header("Content-Length", length.to_string());
        if let Some(file) = file {
            builder = builder.body(FileBody { file, length });
        }
        builder.build(cfg)
    }
}
