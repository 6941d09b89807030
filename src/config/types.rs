// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// SQLite database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Path of the database file to read
    pub path: String,
    /// Apply `PRAGMA case_sensitive_like = ON` to every connection
    #[serde(default)]
    pub case_sensitive_like: bool,
}

/// Dashboard page and static asset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Client polling interval in seconds
    pub refresh_interval: f64,
    pub static_dir: String,
    /// URL prefix static assets are served under (e.g. "/static")
    pub static_prefix: String,
    /// Page template inside `static_dir` served at "/"
    pub index_file: String,
}

impl DashboardConfig {
    /// Refresh interval in whole milliseconds, as substituted into the page
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn refresh_ms(&self) -> u64 {
        let ms = self.refresh_interval * 1000.0;
        if ms <= 0.0 {
            0
        } else if ms >= u64::MAX as f64 {
            u64::MAX
        } else {
            ms.trunc() as u64
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard(refresh_interval: f64) -> DashboardConfig {
        DashboardConfig {
            refresh_interval,
            static_dir: "static".to_string(),
            static_prefix: "/static".to_string(),
            index_file: "index.html".to_string(),
        }
    }

    #[test]
    fn test_refresh_ms_truncates() {
        assert_eq!(dashboard(2.0).refresh_ms(), 2000);
        assert_eq!(dashboard(1.5).refresh_ms(), 1500);
        assert_eq!(dashboard(0.0015).refresh_ms(), 1);
    }

    #[test]
    fn test_refresh_ms_clamps_negative() {
        assert_eq!(dashboard(-3.0).refresh_ms(), 0);
    }
}
