//! Environment configuration, resolved once at startup.
//!
//! A missing `DATABASE_PATH` is fatal: the server refuses to start without a
//! place to persist scan records.

use std::env;
use std::path::PathBuf;

pub const APP_NAME: &str = "NeuroScan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default model service address (local Flask-style dev server).
pub const DEFAULT_MODEL_API_URL: &str = "http://127.0.0.1:5000";
/// Default listen port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;
/// Default outbound timeout for model calls, in seconds.
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;

/// Directories probed for the browser frontend when `FRONTEND_DIR` is unset.
const FRONTEND_CANDIDATES: &[&str] = &["Frontend", "../Frontend"];

pub fn default_log_filter() -> &'static str {
    "neuroscan=info,tower_http=warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_PATH environment variable is not set")]
    MissingDatabasePath,
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub model_api_url: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub model_timeout_secs: u64,
    pub frontend_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup (testable seam).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let model_api_url = lookup("MODEL_API_URL")
            .unwrap_or_else(|| DEFAULT_MODEL_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let database_path = lookup("DATABASE_PATH")
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingDatabasePath)?;

        let model_timeout_secs = match lookup("MODEL_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: "MODEL_TIMEOUT_SECS",
                value: raw,
            })?,
            None => DEFAULT_MODEL_TIMEOUT_SECS,
        };

        let frontend_dir = match lookup("FRONTEND_DIR") {
            Some(dir) => Some(PathBuf::from(dir)),
            None => resolve_frontend_dir(),
        }
        .filter(|dir| dir.is_dir());

        Ok(Self {
            model_api_url,
            port,
            database_path,
            model_timeout_secs,
            frontend_dir,
        })
    }
}

/// First existing candidate frontend directory, if any.
fn resolve_frontend_dir() -> Option<PathBuf> {
    FRONTEND_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|dir| dir.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map = vars(pairs);
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn missing_database_path_is_fatal() {
        let result = load(&[("MODEL_API_URL", "http://model:5000")]);
        assert!(matches!(result, Err(ConfigError::MissingDatabasePath)));
    }

    #[test]
    fn defaults_apply_when_only_database_path_is_set() {
        let config = load(&[("DATABASE_PATH", "/tmp/neuroscan.db")]).unwrap();
        assert_eq!(config.model_api_url, DEFAULT_MODEL_API_URL);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.model_timeout_secs, DEFAULT_MODEL_TIMEOUT_SECS);
    }

    #[test]
    fn model_url_trailing_slash_is_trimmed() {
        let config = load(&[
            ("DATABASE_PATH", "/tmp/neuroscan.db"),
            ("MODEL_API_URL", "http://model:5000/"),
        ])
        .unwrap();
        assert_eq!(config.model_api_url, "http://model:5000");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = load(&[("DATABASE_PATH", "/tmp/x.db"), ("PORT", "not-a-port")]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
    }

    #[test]
    fn frontend_dir_must_exist() {
        let config = load(&[
            ("DATABASE_PATH", "/tmp/x.db"),
            ("FRONTEND_DIR", "/nonexistent/frontend"),
        ])
        .unwrap();
        assert!(config.frontend_dir.is_none());
    }

    #[test]
    fn existing_frontend_dir_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap().to_string();
        let config = load(&[("DATABASE_PATH", "/tmp/x.db"), ("FRONTEND_DIR", &dir)]).unwrap();
        assert_eq!(config.frontend_dir.unwrap(), tmp.path());
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
