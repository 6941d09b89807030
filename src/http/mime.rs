//! Content types for dashboard assets

use std::path::Path;

const FALLBACK: &str = "application/octet-stream";

/// Content type for a file, chosen by its extension (case-insensitive)
///
/// ```
/// use rowwatch::http::mime::content_type_for;
/// use std::path::Path;
/// assert_eq!(content_type_for(Path::new("static/app.js")), "text/javascript; charset=utf-8");
/// assert_eq!(content_type_for(Path::new("LICENSE")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FALLBACK;
    };
    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => FALLBACK,
    }
}
