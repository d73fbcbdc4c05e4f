use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Overrides `database_path` when set.
pub const DB_PATH_ENV: &str = "VANMASTAREN_DB";

const APP_DIR: &str = "vanmastaren";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_MAX_PARALLEL_LOADS: usize = 8;

/// Log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    #[default]
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Persistent configuration. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: LogLevel,
    /// Upper bound on concurrent habit reads during a refresh pass.
    pub max_parallel_loads: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);

        Self {
            database_path: data_dir.join("habits.db"),
            log_dir: data_dir.join("logs"),
            log_level: LogLevel::Info,
            max_parallel_loads: DEFAULT_MAX_PARALLEL_LOADS,
        }
    }
}

/// Application configuration service
pub struct ConfigService {
    config: AppConfig,
    log_level: Arc<AtomicU8>,
    config_path: PathBuf,
}

impl ConfigService {
    /// `<config dir>/vanmastaren/config.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    /// Read the config file at `path`. A missing file gives the defaults; an
    /// unreadable one is logged and replaced by the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str::<AppConfig>(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                AppConfig::default()
            })
        } else {
            AppConfig::default()
        };

        if let Some(db_path) = std::env::var_os(DB_PATH_ENV) {
            config.database_path = PathBuf::from(db_path);
        }
        config.max_parallel_loads = config.max_parallel_loads.max(1);

        info!(
            path = %path.display(),
            database = %config.database_path.display(),
            log_level = config.log_level.as_str(),
            "Config loaded"
        );

        Ok(Self {
            log_level: Arc::new(AtomicU8::new(config.log_level as u8)),
            config,
            config_path: path.to_path_buf(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_log_level(&self) -> LogLevel {
        LogLevel::from_u8(self.log_level.load(Ordering::Relaxed))
    }

    /// Set log level and persist to disk. Takes effect on the next start.
    pub fn set_log_level(&self, level: LogLevel) -> Result<()> {
        self.log_level.store(level as u8, Ordering::Relaxed);

        let config = AppConfig {
            log_level: level,
            ..self.config.clone()
        };
        self.write(&config)?;

        info!(log_level = level.as_str(), path = %self.config_path.display(), "Log level saved");
        Ok(())
    }

    /// Write the current configuration, creating parent directories.
    pub fn save(&self) -> Result<()> {
        let config = AppConfig {
            log_level: self.get_log_level(),
            ..self.config.clone()
        };
        self.write(&config)
    }

    fn write(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write config file {}", self.config_path.display()))?;
        Ok(())
    }
}
