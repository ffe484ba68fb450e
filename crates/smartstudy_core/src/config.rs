//! Runtime configuration for hosts embedding the core.
//!
//! Resolution order: built-in defaults, then an optional JSON file, then
//! `SMARTSTUDY_*` environment variables.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DB_PATH: &str = "SMARTSTUDY_DB_PATH";
pub const ENV_LOG_DIR: &str = "SMARTSTUDY_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "SMARTSTUDY_LOG_LEVEL";
pub const ENV_TICK_MS: &str = "SMARTSTUDY_TICK_MS";

const DEFAULT_DB_FILE_NAME: &str = "smartstudy.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "smartstudy-logs";
const DEFAULT_TICK_MS: u64 = 1000;

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub tick_millis: u64,
}

/// On-disk shape; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    db_path: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    log_level: Option<String>,
    tick_millis: Option<u64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let temp = std::env::temp_dir();
        Self {
            db_path: temp.join(DEFAULT_DB_FILE_NAME),
            log_dir: temp.join(DEFAULT_LOG_DIR_NAME),
            log_level: default_log_level().to_string(),
            tick_millis: DEFAULT_TICK_MS,
        }
    }
}

impl CoreConfig {
    /// Defaults, overlaid with `path` when given, then the process env.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = path {
            config.merge_file(path)?;
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(db_path) = file.db_path {
            self.db_path = db_path;
        }
        if let Some(log_dir) = file.log_dir {
            self.log_dir = log_dir;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        if let Some(tick_millis) = file.tick_millis {
            self.tick_millis = validate_tick(tick_millis.to_string())?;
        }
        Ok(())
    }

    /// Applies overrides from `lookup`; blank values are ignored.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(db_path) = read(ENV_DB_PATH) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(log_dir) = read(ENV_LOG_DIR) {
            self.log_dir = PathBuf::from(log_dir);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(tick) = read(ENV_TICK_MS) {
            self.tick_millis = validate_tick(tick)?;
        }
        Ok(())
    }
}

fn validate_tick(value: String) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(millis) if millis > 0 => Ok(millis),
        _ => Err(ConfigError::InvalidValue {
            key: "tick_millis",
            value,
        }),
    }
}
