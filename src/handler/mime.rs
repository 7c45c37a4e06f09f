//! Extension to content-type table used by static file serving.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

pub const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

const EXTENSIONS: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("xhtml", "text/html"),
    ("css", "text/css"),
    ("gif", "text/gif"),
    ("jpeg", "text/jpeg"),
    ("jpg", "text/jpeg"),
    ("png", "text/png"),
    ("ico", "image/x-icon"),
    ("js", "text/javascript"),
    ("xml", "text/xml"),
    ("xsl", "text/xml"),
    ("rss", "application/rss+xml"),
    ("rdf", "application/rdf+xml"),
    ("pdf", "application/pdf"),
    ("doc", "application/doc"),
    ("zip", "application/zip"),
    ("txt", "text/plain"),
    ("conf", "text/plain"),
    ("rb", "text/plain"),
    ("py", "text/plain"),
    ("h", "text/plain"),
    ("c", "text/plain"),
    ("hh", "text/plain"),
    ("cc", "text/plain"),
    ("hpp", "text/plain"),
    ("cpp", "text/plain"),
];

static CONTENT_TYPES: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| EXTENSIONS.iter().copied().collect());

/// Content type for `path`, matched on its extension ignoring case.
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| CONTENT_TYPES.get(ext.to_ascii_lowercase().as_str()))
        .copied()
        .unwrap_or(UNKNOWN_CONTENT_TYPE)
}
