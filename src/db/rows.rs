//! Row reader
//!
//! Reads the newest rows of one compatible table, optionally filtered by a
//! content substring and an exclusive lower bound on `id`.

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::error::DbError;
use super::schema::{self, CREATED_AT};

/// Row cap applied when the request does not name one
pub const DEFAULT_LIMIT: u32 = 200;

/// Per-request filters for [`read_rows`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    pub limit: u32,
    /// Content substring filter; empty means no filter
    pub q: Option<String>,
    /// Exclusive lower bound on `id`
    pub since_id: Option<String>,
}

impl Default for RowQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            q: None,
            since_id: None,
        }
    }
}

impl RowQuery {
    /// Parse a raw `limit` value; absent means [`DEFAULT_LIMIT`]
    pub fn parse_limit(raw: Option<&str>) -> Result<u32, DbError> {
        let Some(raw) = raw else {
            return Ok(DEFAULT_LIMIT);
        };
        match raw.trim().parse::<u32>() {
            Ok(limit) if limit > 0 => Ok(limit),
            _ => Err(DbError::InvalidLimit(raw.to_string())),
        }
    }
}

/// One projected row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: JsonValue,
    pub content: JsonValue,
    pub created_at: JsonValue,
}

/// Rows plus the limit that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct RowPage {
    pub rows: Vec<Row>,
    pub limit: u32,
}

/// Read rows from `table`, newest `id` first
///
/// The table name is checked against the allow-list before anything touches
/// the connection, and the column check runs before the main query.
pub fn read_rows(conn: &Connection, table: &str, query: &RowQuery) -> Result<RowPage, DbError> {
    if !schema::is_valid_table_name(table) {
        return Err(DbError::InvalidTableName(table.to_string()));
    }

    let columns = schema::table_columns(conn, table)?;
    let created_col = columns
        .iter()
        .find(|c| schema::normalize_column(c) == CREATED_AT);

    if !columns.iter().any(|c| c == "id") || !columns.iter().any(|c| c == "content") {
        return Err(DbError::SchemaMismatch(table.to_string()));
    }

    let (sql, params) = build_select(table, created_col.map(String::as_str), query);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok(Row {
                id: to_json(row.get_ref("id")?),
                content: to_json(row.get_ref("content")?),
                created_at: to_json(row.get_ref("created_at")?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RowPage {
        rows,
        limit: query.limit,
    })
}

/// Build the SELECT text and its bound parameters
fn build_select(
    table: &str,
    created_col: Option<&str>,
    query: &RowQuery,
) -> (String, Vec<SqlValue>) {
    let created_expr = created_col.map_or_else(|| "NULL".to_string(), quote_ident);
    let mut sql = format!(
        "SELECT \"id\" AS id, \"content\" AS content, {created_expr} AS created_at FROM {}",
        quote_ident(table)
    );

    let mut clauses = Vec::new();
    let mut params = Vec::new();
    if let Some(since_id) = &query.since_id {
        clauses.push("\"id\" > ?");
        params.push(since_id_param(since_id));
    }
    if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
        clauses.push("\"content\" LIKE '%' || ? || '%' ESCAPE '\\'");
        params.push(SqlValue::Text(escape_like(q)));
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    sql.push_str(" ORDER BY \"id\" DESC LIMIT ?");
    params.push(SqlValue::Integer(i64::from(query.limit)));

    (sql, params)
}

/// Quote an SQL identifier, doubling embedded quotes
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Integer ids bind as INTEGER, anything else as TEXT; surrounding
/// whitespace is dropped either way
fn since_id_param(raw: &str) -> SqlValue {
    let value = raw.trim();
    value
        .parse::<i64>()
        .map_or_else(|_| SqlValue::Text(value.to_string()), SqlValue::Integer)
}

/// Escape LIKE wildcards so `q` matches literally
fn escape_like(q: &str) -> String {
    let mut escaped = String::with_capacity(q.len());
    for c in q.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Map an SQLite dynamic value onto JSON
fn to_json(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => JsonValue::from(i),
        ValueRef::Real(f) => {
            serde_json::Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number)
        }
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            JsonValue::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
