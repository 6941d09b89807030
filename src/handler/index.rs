//! Dashboard page
//!
//! Serves the index template with the refresh interval and database path
//! filled in. The template is read on every request so edits show up
//! without a restart.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::path::Path;
use tokio::fs;

use crate::config::Config;
use crate::http;
use crate::logger;

/// Placeholder replaced by the refresh interval in milliseconds
pub const REFRESH_MS_PLACEHOLDER: &str = "%REFRESH_MS%";
/// Placeholder replaced by the HTML-escaped database path
pub const DB_PATH_PLACEHOLDER: &str = "%DB_PATH%";

/// Serve the rendered dashboard page
pub async fn serve_index(config: &Config) -> Response<Full<Bytes>> {
    let dashboard = &config.dashboard;
    let path = Path::new(&dashboard.static_dir).join(&dashboard.index_file);
    match fs::read_to_string(&path).await {
        Ok(template) => http::build_html_response(render_index(
            &template,
            dashboard.refresh_ms(),
            &config.database.path,
        )),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read index template '{}': {e}",
                path.display()
            ));
            http::build_text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "500 Internal Server Error",
            )
        }
    }
}

/// Substitute both placeholders in `template`
pub fn render_index(template: &str, refresh_ms: u64, db_path: &str) -> String {
    template
        .replace(REFRESH_MS_PLACEHOLDER, &refresh_ms.to_string())
        .replace(DB_PATH_PLACEHOLDER, &escape_html(db_path))
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
