// crates/psgc-core/src/config.rs

//! Layered settings: built-in defaults, then an optional TOML file, then
//! environment overrides (`PORT`, `PSGC_DB`, `ENV`). Command-line flags are
//! applied last by the binary.
//!
//! ```toml
//! [database]
//! path = "files/db/psgc.db"
//!
//! [load]
//! batch_size = 5000
//! best_effort = false
//!
//! [server]
//! port = 5000
//!
//! [log]
//! level = "info"
//! format = "json"
//! ```

use crate::error::{PsgcError, Result};
use crate::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_PATH: &str = "files/db/psgc.db";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsgcConfig {
    pub database: DatabaseConfig,
    pub load: LoadConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// CSV to ingest; `None` means `files/csv/psgc_<current year>.csv`.
    pub source: Option<PathBuf>,
    /// Records per transaction; `None` loads everything in one transaction.
    pub batch_size: Option<usize>,
    pub best_effort: bool,
    /// Clear the tables before writing.
    pub reset: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            source: None,
            batch_size: None,
            best_effort: false,
            reset: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` disables the per-request timeout.
    pub request_timeout_secs: Option<u64>,
    /// Maximum in-flight requests; `None` is unbounded.
    pub concurrency_limit: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            concurrency_limit: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl PsgcConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| PsgcError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PsgcError::io(path.display().to_string(), e))?;
        Self::from_toml_str(&text)
            .map_err(|e| PsgcError::Config(format!("{}: {e}", path.display())))
    }

    /// Applies `PORT`, `PSGC_DB` and `ENV` from `lookup`.
    ///
    /// `ENV=development` switches to verbose pretty logs and
    /// `ENV=production` to JSON lines. An unparsable
    /// `PORT` is a [`PsgcError::Config`].
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("PORT").filter(|v| !v.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| PsgcError::Config(format!("PORT must be a port number, got {port:?}")))?;
        }
        if let Some(db) = lookup("PSGC_DB").filter(|v| !v.trim().is_empty()) {
            self.database.path = PathBuf::from(db);
        }
        match lookup("ENV").map(|env| env.trim().to_ascii_lowercase()).as_deref() {
            Some("development") => self.log = LogConfig::development(),
            Some("production") => self.log = LogConfig::production(),
            _ => {}
        }
        Ok(())
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_file() {
        let config = PsgcConfig::from_toml_str("").unwrap();
        assert_eq!(config, PsgcConfig::default());
        assert_eq!(config.server.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.database.path, PathBuf::from("files/db/psgc.db"));
        assert!(config.load.reset);
        assert_eq!(config.load.batch_size, None);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PsgcConfig::from_toml_str(
            r#"
            [server]
            port = 8080

            [load]
            batch_size = 500

            [log]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.load.batch_size, Some(500));
        assert!(config.load.reset);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = PsgcConfig::from_toml_str("[server]\nport = \"many\"").unwrap_err();
        assert!(matches!(err, PsgcError::Config(_)));
    }

    #[test]
    fn environment_overrides() {
        let env: HashMap<&str, &str> = [("PORT", "9000"), ("PSGC_DB", "/tmp/x.db"), ("ENV", "development")]
            .into_iter()
            .collect();
        let mut config = PsgcConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.log, LogConfig::development());
    }

    #[test]
    fn production_env_selects_json_logs() {
        let mut config = PsgcConfig::default();
        config
            .apply_overrides(|k| (k == "ENV").then(|| "Production".to_string()))
            .unwrap();
        assert_eq!(config.log, LogConfig::production());
        assert_eq!(config.log.format, LogFormat::Json);

        let mut config = PsgcConfig::default();
        config
            .apply_overrides(|k| (k == "ENV").then(|| "staging".to_string()))
            .unwrap();
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut config = PsgcConfig::default();
        let err = config
            .apply_overrides(|k| (k == "PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(err, PsgcError::Config(_)));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("psgc.toml");
        std::fs::write(&path, "[database]\npath = \"data/psgc.db\"\n").unwrap();
        let config = PsgcConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.database.path, PathBuf::from("data/psgc.db"));
    }
}
