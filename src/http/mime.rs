//! Extension to content-type lookup.

const CONTENT_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("jpg", "image/jpg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("txt", "text/plain"),
    ("htm", "text/html"),
    ("ico", "image/x-icon"),
    ("pdf", "application/pdf"),
    ("json", "application/json"),
    ("bin", "application/octet-stream"),
    ("bmp", "image/bmp"),
    ("csv", "text/csv"),
    ("webp", "image/webp"),
    ("jpeg", "image/jpg"),
];

/// Returns the content type for `path`, or an empty string when unknown.
///
/// Only the text after the final `.` is considered, matched exactly and
/// case-sensitively. A dot in the first position is not an extension
/// separator, so `".html"` is unknown.
///
/// ```
/// # use staticd::http::mime::content_type;
/// assert_eq!(content_type("www/app.js"), "application/javascript");
/// assert_eq!(content_type("www/main.rs"), "");
/// ```
pub fn content_type(path: &str) -> &'static str {
    let ext = match path.rfind('.') {
        Some(dot) if dot > 0 => &path[dot + 1..],
        _ => return "",
    };

    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or("")
}
