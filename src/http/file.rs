//! Filesystem lookups for the file a request resolves to.

use std::io;
use std::path::Path;

use tokio::fs::File;

use crate::http::response::StatusCode;

/// Outcome of querying the resolved path. Queried fresh for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMeta {
    /// A regular file of this many bytes.
    Found(u64),
    NotFound,
    Forbidden,
    Other(io::ErrorKind),
}

impl FileMeta {
    pub async fn query(path: impl AsRef<Path>) -> Self {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => FileMeta::Found(meta.len()),
            // Directories are not listed.
            Ok(_) => FileMeta::NotFound,
            Err(e) => Self::from_error(&e),
        }
    }

    pub fn from_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => FileMeta::Forbidden,
            io::ErrorKind::NotFound => FileMeta::NotFound,
            kind => FileMeta::Other(kind),
        }
    }

    /// Status to answer with when the lookup did not find a servable file.
    pub fn error_status(&self) -> StatusCode {
        match self {
            FileMeta::Forbidden => StatusCode::Forbidden,
            _ => StatusCode::NotFound,
        }
    }
}

/// An opened file waiting to be sent as a response body.
#[derive(Debug)]
pub struct FileBody {
    pub file: File,
    /// Bytes promised in `Content-Length`.
    pub length: u64,
}
