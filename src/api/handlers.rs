// Table and row handlers

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::sync::Arc;

use super::query::parse_row_query;
use super::response::{db_error_response, json_response};
use super::types::{RowsMeta, RowsResponse, TablesResponse};
use crate::config::AppState;
use crate::db::{self, DbError, ErrorKind};
use crate::logger;

/// `GET /api/tables`: compatible tables in name order
pub async fn handle_tables(state: Arc<AppState>) -> Response<Full<Bytes>> {
    match state.database.run(db::list_compatible_tables).await {
        Ok(tables) => {
            logger::log_api_request("GET", "/api/tables", 200);
            json_response(StatusCode::OK, &TablesResponse { tables })
        }
        Err(e) => failure("/api/tables", &e),
    }
}

/// `GET /api/rows/{table}`: newest rows of one table
pub async fn handle_rows(
    state: Arc<AppState>,
    table: &str,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    let path = format!("/api/rows/{table}");

    // Reject bad input before a connection is opened
    if !db::is_valid_table_name(table) {
        return failure(&path, &DbError::InvalidTableName(table.to_string()));
    }
    let row_query = match parse_row_query(query) {
        Ok(q) => q,
        Err(e) => return failure(&path, &e),
    };

    let table = table.to_string();
    let result = state
        .database
        .run(move |conn| db::read_rows(conn, &table, &row_query))
        .await;

    match result {
        Ok(page) => {
            logger::log_api_request("GET", &path, 200);
            json_response(
                StatusCode::OK,
                &RowsResponse {
                    rows: page.rows,
                    meta: RowsMeta { limit: page.limit },
                },
            )
        }
        Err(e) => failure(&path, &e),
    }
}

/// Log and convert an error at the request boundary
fn failure(path: &str, err: &DbError) -> Response<Full<Bytes>> {
    let status = err.status();
    if err.kind() == ErrorKind::Storage {
        logger::log_error(&format!("GET {path} failed: {err}"));
    }
    logger::log_api_request("GET", path, status.as_u16());
    db_error_response(err)
}
