//! Request URI to filesystem path mapping.

use std::fmt;

use crate::config::PATH_BUFFER_SIZE;

const DEFAULT_DOCUMENT: &str = "index.html";

/// URIs that are served the default document.
const DEFAULT_ALIASES: &[&str] = &["/", "/inside/"];

/// The resolved path would not fit in `PATH_BUFFER_SIZE` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathTooLong {
    pub len: usize,
}

impl fmt::Display for PathTooLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resolved path is {} bytes, limit is {}",
            self.len, PATH_BUFFER_SIZE
        )
    }
}

impl std::error::Error for PathTooLong {}

/// Maps `uri` to the path served for it under `root`.
///
/// `..` segments are passed through untouched.
pub fn resolve(uri: &str, root: &str) -> Result<String, PathTooLong> {
    let path = if DEFAULT_ALIASES.contains(&uri) {
        format!("{root}/{DEFAULT_DOCUMENT}")
    } else {
        let len = root.len() + uri.len();
        if len > PATH_BUFFER_SIZE {
            return Err(PathTooLong { len });
        }
        let mut path = String::with_capacity(len);
        path.push_str(root);
        path.push_str(uri);
        path
    };

    if path.len() > PATH_BUFFER_SIZE {
        return Err(PathTooLong { len: path.len() });
    }
    Ok(path)
}
