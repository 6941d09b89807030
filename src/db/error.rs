//! Database error types

use hyper::StatusCode;
use thiserror::Error;

/// Coarse error classes surfaced at the HTTP boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request parameters, rejected before any query runs
    InvalidInput,
    /// Table exists but lacks the required columns
    SchemaMismatch,
    /// Opening the database or running a query failed
    Storage,
}

/// Errors raised by the schema prober and row reader
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Invalid table name")]
    InvalidTableName(String),
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
    #[error("Table missing id/content columns")]
    SchemaMismatch(String),
    #[error("no such table: {0}")]
    NoSuchTable(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database worker failed: {0}")]
    Worker(String),
}

impl DbError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTableName(_) | Self::InvalidLimit(_) => ErrorKind::InvalidInput,
            Self::SchemaMismatch(_) => ErrorKind::SchemaMismatch,
            Self::NoSuchTable(_) | Self::Sqlite(_) | Self::Worker(_) => ErrorKind::Storage,
        }
    }

    /// HTTP status for this error
    pub const fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput | ErrorKind::SchemaMismatch => StatusCode::BAD_REQUEST,
            ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
