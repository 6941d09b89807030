// API module entry
// Read-only JSON views over the configured SQLite database

mod handlers;
mod query;
mod response;
mod types;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::sync::Arc;

use crate::config::AppState;
use crate::logger;

pub use response::{error_response, json_response, not_found};
pub use types::{ErrorResponse, RowsMeta, RowsResponse, TablesResponse};

/// Path prefix owned by this module
pub const API_PREFIX: &str = "/api/";

const ROWS_PREFIX: &str = "/api/rows/";

/// API route handler
///
/// `path` must start with [`API_PREFIX`]; `query` is the raw query string.
pub async fn handle_api(
    path: &str,
    query: Option<&str>,
    state: Arc<AppState>,
) -> Response<Full<Bytes>> {
    if path == "/api/tables" {
        return handlers::handle_tables(state).await;
    }

    if let Some(segment) = path.strip_prefix(ROWS_PREFIX) {
        if !segment.is_empty() && !segment.contains('/') {
            // An encoded `/` decodes here and is then refused by the name allow-list
            let table = percent_decode_str(segment).decode_utf8_lossy();
            return handlers::handle_rows(state, &table, query).await;
        }
    }

    logger::log_api_request("GET", path, 404);
    not_found()
}
