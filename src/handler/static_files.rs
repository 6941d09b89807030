//! Static file serving module
//!
//! Serves dashboard assets from the static directory with MIME detection and
//! `ETag` revalidation.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Serve `ctx.path` from `static_dir`, with `prefix` stripped from the path
pub async fn serve_static(
    ctx: &RequestContext,
    static_dir: &str,
    prefix: &str,
) -> Response<Full<Bytes>> {
    let relative = ctx
        .path
        .strip_prefix(prefix)
        .unwrap_or(ctx.path.as_str())
        .trim_start_matches('/');

    match load_from_directory(static_dir, relative).await {
        Some((content, content_type)) => {
            build_static_file_response(content, content_type, ctx.if_none_match.as_deref())
        }
        None => http::build_404_response(),
    }
}

/// Load a file below `static_dir`
///
/// Returns `None` for missing files, directories and anything that resolves
/// outside `static_dir`.
pub async fn load_from_directory(
    static_dir: &str,
    relative_path: &str,
) -> Option<(Vec<u8>, &'static str)> {
    if relative_path.is_empty() {
        return None;
    }

    let static_dir_canonical = match Path::new(static_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    // File not found is common (404), no need to log at warning level
    let Ok(file_path) = static_dir_canonical.join(relative_path).canonicalize() else {
        return None;
    };
    if !file_path.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {relative_path} -> {}",
            file_path.display()
        ));
        return None;
    }
    if !file_path.is_file() {
        return None;
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return None;
        }
    };

    let content_type = mime::content_type_for(&file_path);
    Some((content, content_type))
}

/// Build static file response with `ETag` revalidation
fn build_static_file_response(
    data: Vec<u8>,
    content_type: &str,
    if_none_match: Option<&str>,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);

    // Check if client has cached version
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    http::build_cached_response(Bytes::from(data), content_type, &etag)
}
