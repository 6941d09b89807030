// Shared fixtures for unit tests

use std::path::{Path, PathBuf};
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::Response;
use tempfile::TempDir;

use crate::config::{
    AppState, Config, DashboardConfig, DatabaseConfig, HttpConfig, LoggingConfig,
    PerformanceConfig, ServerConfig,
};

/// Configuration pointing at `db_path` and `static_dir`
pub fn test_config(db_path: &Path, static_dir: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: None,
        },
        database: DatabaseConfig {
            path: db_path.to_string_lossy().into_owned(),
            case_sensitive_like: false,
        },
        dashboard: DashboardConfig {
            refresh_interval: 2.0,
            static_dir: static_dir.to_string(),
            static_prefix: "/static".to_string(),
            index_file: "index.html".to_string(),
        },
        logging: LoggingConfig {
            level: "error".to_string(),
            access_log: false,
            access_log_format: "combined".to_string(),
            access_log_file: None,
            error_log_file: None,
        },
        performance: PerformanceConfig {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        },
        http: HttpConfig {
            server_name: "rowwatch".to_string(),
            enable_cors: true,
            max_body_size: 1_048_576,
        },
    }
}

pub fn test_state(db_path: &Path, static_dir: &str) -> Arc<AppState> {
    Arc::new(AppState::new(&test_config(db_path, static_dir)))
}

/// Create a database file in a fresh temp dir and run `sql` against it
pub fn feed_database(sql: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(sql).unwrap();
    // An empty schema still needs the file header on disk
    conn.execute_batch("PRAGMA user_version = 1;").unwrap();
    (dir, path)
}

pub async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
    resp.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}
