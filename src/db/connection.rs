//! Connection factory
//!
//! Every request opens its own read-only connection and closes it when the
//! closure it was lent to returns, whether that closure succeeded or not.

use std::path::PathBuf;

use rusqlite::{Connection, OpenFlags};

use super::error::DbError;
use crate::config::DatabaseConfig;

/// Handle to the configured database file
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    case_sensitive_like: bool,
}

impl Database {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            path: PathBuf::from(&config.path),
            case_sensitive_like: config.case_sensitive_like,
        }
    }

    /// Open a fresh read-only connection
    ///
    /// No pooling and no retry: a missing or unreadable file fails right away.
    pub fn open(&self) -> Result<Connection, DbError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags)?;
        if self.case_sensitive_like {
            conn.execute_batch("PRAGMA case_sensitive_like = ON;")?;
        }
        Ok(conn)
    }

    /// Open a connection, lend it to `f`, and drop it on every exit path
    pub fn with_connection<T, F>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self.open()?;
        f(&conn)
    }

    /// Run `f` against a fresh connection on the blocking thread pool
    pub async fn run<T, F>(&self, f: F) -> Result<T, DbError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DbError> + Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.with_connection(f))
            .await
            .map_err(|e| DbError::Worker(e.to_string()))?
    }
}
