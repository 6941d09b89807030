// API response body types

use serde::Serialize;

use crate::db::Row;

/// Body of `GET /api/tables`
#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub tables: Vec<String>,
}

/// Body of `GET /api/rows/{table}`
#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub rows: Vec<Row>,
    pub meta: RowsMeta,
}

#[derive(Debug, Serialize)]
pub struct RowsMeta {
    /// Row cap the query ran with
    pub limit: u32,
}

/// Body of every API error
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
