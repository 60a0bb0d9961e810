//! # Adapters Module
//!
//! - `storage`: `KeyValueStore` implementations (in-memory, file-backed)
//! - `repository`: lot repository and audit log over a `KeyValueStore`

pub mod repository;
pub mod storage;

pub use repository::{KvLotRepository, MigrationReport};
pub use storage::InMemoryKVStore;
#[cfg(feature = "file-store")]
pub use storage::FileBackedKVStore;
