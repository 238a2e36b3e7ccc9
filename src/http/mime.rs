//! MIME type detection based on file extensions.

use std::path::Path;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

static MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("txt", "text/plain"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("json", "application/json"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("pdf", "application/pdf"),
];

/// Looks up the MIME type for an extension (without the dot), ignoring case.
pub fn from_extension(ext: &str) -> Option<&'static str> {
    MIME_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
}

/// Guesses a file's MIME type from its extension, falling back to
/// `application/octet-stream`.
pub fn guess(path: impl AsRef<Path>) -> &'static str {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(from_extension)
        .unwrap_or(DEFAULT_MIME_TYPE)
}
