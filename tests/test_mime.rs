use courier::http::mime::{DEFAULT_MIME_TYPE, from_extension, guess};

#[test]
fn test_known_extensions() {
    assert_eq!(guess("index.html"), "text/html");
    assert_eq!(guess("notes.txt"), "text/plain");
    assert_eq!(guess("photo.jpg"), "image/jpeg");
    assert_eq!(guess("photo.jpeg"), "image/jpeg");
    assert_eq!(guess("logo.png"), "image/png");
    assert_eq!(guess("app.js"), "text/javascript");
}

#[test]
fn test_extension_case_is_ignored() {
    assert_eq!(guess("INDEX.HTML"), "text/html");
    assert_eq!(from_extension("PnG"), Some("image/png"));
}

#[test]
fn test_unknown_or_missing_extension_defaults() {
    assert_eq!(guess("archive.tar.gz"), DEFAULT_MIME_TYPE);
    assert_eq!(guess("Makefile"), DEFAULT_MIME_TYPE);
    assert_eq!(guess(".bashrc"), DEFAULT_MIME_TYPE);
    assert_eq!(guess("trailing."), DEFAULT_MIME_TYPE);
    assert_eq!(from_extension("exe"), None);
}

#[test]
fn test_only_last_extension_counts() {
    assert_eq!(guess("page.txt.html"), "text/html");
    assert_eq!(guess("dir.html/data"), DEFAULT_MIME_TYPE);
}
