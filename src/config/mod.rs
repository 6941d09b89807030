// Configuration module entry point
// Loads the immutable startup configuration and the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DashboardConfig, DatabaseConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    ServerConfig,
};

/// Environment variable naming the database file
pub const DB_PATH_ENV: &str = "SQLITE_DB";
/// Environment variable holding the client refresh interval in seconds
pub const REFRESH_INTERVAL_ENV: &str = "REFRESH_INTERVAL";

/// Values taken from the plain (unprefixed) environment variables
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub db_path: Option<String>,
    pub refresh_interval: Option<String>,
}

impl EnvOverrides {
    /// Read `SQLITE_DB` and `REFRESH_INTERVAL` from the process environment
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var(DB_PATH_ENV).ok(),
            refresh_interval: std::env::var(REFRESH_INTERVAL_ENV).ok(),
        }
    }
}

/// `ROWWATCH_SECTION__KEY` variables, e.g. `ROWWATCH_SERVER__PORT=8081`
fn prefixed_env() -> config::Environment {
    config::Environment::with_prefix("ROWWATCH")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with(config_path, EnvOverrides::from_env())
    }

    /// Load configuration, applying the given legacy overrides last
    pub fn load_with(
        config_path: &str,
        overrides: EnvOverrides,
    ) -> Result<Self, config::ConfigError> {
        Self::load_layers(config_path, prefixed_env(), overrides)
    }

    /// Defaults, then `config_path`, then `env`, then `overrides`
    fn load_layers(
        config_path: &str,
        env: config::Environment,
        overrides: EnvOverrides,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("database.path", "example.db")?
            .set_default("database.case_sensitive_like", false)?
            .set_default("dashboard.refresh_interval", 2.0)?
            .set_default("dashboard.static_dir", "static")?
            .set_default("dashboard.static_prefix", "/static")?
            .set_default("dashboard.index_file", "index.html")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "rowwatch")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_override_option("database.path", overrides.db_path)?
            .set_override_option("dashboard.refresh_interval", overrides.refresh_interval)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate().map_err(config::ConfigError::Message)?;
        Ok(cfg)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), String> {
        let interval = self.dashboard.refresh_interval;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(format!(
                "dashboard.refresh_interval must be a positive number of seconds, got {interval}"
            ));
        }
        if !self.dashboard.static_prefix.starts_with('/') {
            return Err(format!(
                "dashboard.static_prefix must start with '/', got '{}'",
                self.dashboard.static_prefix
            ));
        }
        self.get_socket_addr()?;
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_file() -> String {
        let dir = tempfile::tempdir().unwrap();
        dir.path().join("absent").to_string_lossy().into_owned()
    }

    #[test]
    fn test_defaults() {
        let cfg =
            Config::load_layers(&missing_file(), env_vars(&[]), EnvOverrides::default()).unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.database.path, "example.db");
        assert!(!cfg.database.case_sensitive_like);
        assert_eq!(cfg.dashboard.refresh_ms(), 2000);
        assert_eq!(cfg.dashboard.static_prefix, "/static");
        assert!(cfg.http.enable_cors);
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_legacy_env_overrides() {
        let overrides = EnvOverrides {
            db_path: Some("/data/feed.db".to_string()),
            refresh_interval: Some("0.5".to_string()),
        };
        let cfg = Config::load_layers(&missing_file(), env_vars(&[]), overrides).unwrap();
        assert_eq!(cfg.database.path, "/data/feed.db");
        assert_eq!(cfg.dashboard.refresh_ms(), 500);
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rowwatch.toml");
        std::fs::write(
            &path,
            "[server]\nport = 8081\n\n[database]\npath = \"feed.db\"\ncase_sensitive_like = true\n",
        )
        .unwrap();
        let stem = dir.path().join("rowwatch");
        let cfg = Config::load_layers(
            &stem.to_string_lossy(),
            env_vars(&[]),
            EnvOverrides::default(),
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.database.path, "feed.db");
        assert!(cfg.database.case_sensitive_like);
    }

    fn env_vars(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        prefixed_env().source(Some(map))
    }

    #[test]
    fn test_prefixed_env_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rowwatch.toml"),
            "[server]\nport = 8081\n\n[http]\nenable_cors = true\n",
        )
        .unwrap();
        let stem = dir.path().join("rowwatch");
        let env = env_vars(&[
            ("ROWWATCH_SERVER__PORT", "9090"),
            ("ROWWATCH_HTTP__ENABLE_CORS", "false"),
            ("ROWWATCH_DASHBOARD__REFRESH_INTERVAL", "0.25"),
            ("UNRELATED_SERVER__PORT", "1"),
        ]);

        let cfg = Config::load_layers(&stem.to_string_lossy(), env, EnvOverrides::default())
            .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert!(!cfg.http.enable_cors);
        assert_eq!(cfg.dashboard.refresh_ms(), 250);
    }

    #[test]
    fn test_legacy_overrides_beat_prefixed_env() {
        let env = env_vars(&[("ROWWATCH_DATABASE__PATH", "from-env.db")]);
        let overrides = EnvOverrides {
            db_path: Some("legacy.db".to_string()),
            refresh_interval: None,
        };
        let cfg = Config::load_layers(&missing_file(), env, overrides).unwrap();
        assert_eq!(cfg.database.path, "legacy.db");
    }

    #[test]
    fn test_rejects_non_positive_interval() {
        let overrides = EnvOverrides {
            db_path: None,
            refresh_interval: Some("0".to_string()),
        };
        assert!(Config::load_layers(&missing_file(), env_vars(&[]), overrides).is_err());
    }
}
