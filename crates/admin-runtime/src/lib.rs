//! # Auction Admin Runtime
//!
//! Wires the lot sequencing subsystem (ah-01) to a storage backend and
//! serves it through the admin API (ah-02).
//!
//! ## Modular Structure
//!
//! - `config` - layered runtime configuration (defaults, file, environment)
//! - `adapters/` - production storage backends
//! - `runtime` - data directory lock, migration and service assembly

pub mod adapters;
pub mod config;
pub mod runtime;

pub use config::{RuntimeConfig, RuntimeConfigError, StorageBackend, StorageConfig};
pub use runtime::{build_api, AdminRuntime, DataDirLock};
