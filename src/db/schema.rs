//! Schema prober
//!
//! Finds the tables a dashboard can display: those carrying an id, a content
//! and a creation-timestamp column.

use rusqlite::Connection;

use super::error::DbError;

/// Normalized names every compatible table must carry
pub const REQUIRED_COLUMNS: [&str; 3] = ["id", "content", "created_at"];

/// Normalized name of the creation-timestamp column
pub const CREATED_AT: &str = "created_at";

/// Lowercase a column name and treat `-` as `_`
pub fn normalize_column(name: &str) -> String {
    name.to_lowercase().replace('-', "_")
}

/// Table names may only contain ASCII letters, digits, `_` and `-`
pub fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Column names of `table` in declaration order; empty if the table is unknown
pub fn column_names(conn: &Connection, table: &str) -> Result<Vec<String>, DbError> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Column names of an existing table
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, DbError> {
    let names = column_names(conn, table)?;
    if names.is_empty() {
        return Err(DbError::NoSuchTable(table.to_string()));
    }
    Ok(names)
}

/// Whether the normalized column set contains every required column
pub fn has_required_columns<S: AsRef<str>>(columns: &[S]) -> bool {
    let normalized: Vec<String> = columns
        .iter()
        .map(|c| normalize_column(c.as_ref()))
        .collect();
    REQUIRED_COLUMNS
        .iter()
        .all(|required| normalized.iter().any(|c| c == required))
}

/// User tables with the required columns, sorted by name
///
/// Any storage failure aborts the whole listing.
pub fn list_compatible_tables(conn: &Connection) -> Result<Vec<String>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut compatible = Vec::new();
    for name in names {
        if has_required_columns(&column_names(conn, &name)?) {
            compatible.push(name);
        }
    }
    Ok(compatible)
}
