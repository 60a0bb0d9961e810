//! # Runtime Configuration
//!
//! Unified configuration for the admin runtime: the HTTP surface, the
//! sequencing rules and the storage backend.
//!
//! ## Sources (later wins)
//!
//! 1. Defaults
//! 2. JSON file named by `AH_CONFIG` (missing sections keep their defaults)
//! 3. Environment overrides (`AH_HTTP_HOST`, `AH_HTTP_PORT`, `AH_DATA_DIR`,
//!    `AH_STORAGE_BACKEND`, `AH_MAX_BATCH_SIZE`, `AH_REQUEST_TIMEOUT_MS`)
//!
//! An override that does not parse is logged and ignored.

use ah_01_lot_sequencing::SequencingConfig;
use ah_02_admin_api::AdminApiConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_FILE_ENV: &str = "AH_CONFIG";

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Admin API configuration.
    pub api: AdminApiConfig,
    /// Sequencing rules.
    pub sequencing: SequencingConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which key-value store backs the repository.
    pub backend: StorageBackend,
    /// Directory holding the store and the process lock.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Available key-value store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile in-memory store.
    Memory,
    /// Single-file store under the data directory.
    File,
    /// RocksDB under the data directory (`rocksdb` feature).
    RocksDb,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::File => "file",
            StorageBackend::RocksDb => "rocksdb",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = RuntimeConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            "rocksdb" => Ok(StorageBackend::RocksDb),
            other => Err(RuntimeConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeConfigError {
    #[error("unknown storage backend '{0}' (expected memory, file or rocksdb)")]
    UnknownBackend(String),

    #[error("failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl RuntimeConfig {
    /// Load configuration from `AH_CONFIG` (if set) and the process environment.
    pub fn load() -> Result<Self, RuntimeConfigError> {
        let mut config = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuntimeConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| RuntimeConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = serde_json::from_str(&raw).map_err(|e| RuntimeConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Apply `AH_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = parsed(&lookup, "AH_HTTP_HOST") {
            self.api.http.host = host;
        }
        if let Some(port) = parsed(&lookup, "AH_HTTP_PORT") {
            self.api.http.port = port;
        }
        if let Some(dir) = lookup("AH_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(backend) = parsed(&lookup, "AH_STORAGE_BACKEND") {
            self.storage.backend = backend;
        }
        if let Some(size) = parsed::<usize, _>(&lookup, "AH_MAX_BATCH_SIZE") {
            if size == 0 {
                warn!(var = "AH_MAX_BATCH_SIZE", "Ignoring zero batch size");
            } else {
                self.sequencing.max_batch_size = size;
            }
        }
        if let Some(ms) = parsed::<u64, _>(&lookup, "AH_REQUEST_TIMEOUT_MS") {
            if ms == 0 {
                warn!(var = "AH_REQUEST_TIMEOUT_MS", "Ignoring zero request timeout");
            } else {
                self.api.timeouts.request = Duration::from_millis(ms);
            }
        }
    }

    /// Validate the combined configuration.
    pub fn validate(&self) -> Result<(), RuntimeConfigError> {
        self.api
            .validate()
            .map_err(|e| RuntimeConfigError::Invalid(e.to_string()))?;

        if self.sequencing.max_batch_size == 0 {
            return Err(RuntimeConfigError::Invalid(
                "sequencing.max_batch_size cannot be 0".into(),
            ));
        }

        if self.storage.backend == StorageBackend::RocksDb && !cfg!(feature = "rocksdb") {
            return Err(RuntimeConfigError::Invalid(
                "the rocksdb backend requires building with --features rocksdb".into(),
            ));
        }

        Ok(())
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(var = key, value = %raw, error = %e, "Ignoring invalid environment override");
            None
        }
    }
}
