// Application state module
// Holds the startup configuration and the database handle shared by all requests

use super::types::Config;
use crate::db::Database;

/// Application state
///
/// Read-only after construction; requests share it through an `Arc`.
pub struct AppState {
    pub config: Config,
    pub database: Database,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            database: Database::new(&config.database),
        }
    }

    /// Whether one access log line should be written per request
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
