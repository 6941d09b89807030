//! Database access layer
//!
//! Read-only SQLite access: a per-request connection factory, the schema
//! prober behind `/api/tables` and the row reader behind `/api/rows/{table}`.

mod connection;
mod error;
pub mod rows;
pub mod schema;

pub use connection::Database;
pub use error::{DbError, ErrorKind};
pub use rows::{read_rows, Row, RowPage, RowQuery, DEFAULT_LIMIT};
pub use schema::{is_valid_table_name, list_compatible_tables};
