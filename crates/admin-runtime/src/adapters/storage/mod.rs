//! # Production Storage Adapters
//!
//! Enable the `rocksdb` feature to use the RocksDB backend:
//!
//! ```toml
//! admin-runtime = { path = "...", features = ["rocksdb"] }
//! ```
//!
//! The memory and file backends come from `ah-01-lot-sequencing`.

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

pub use ah_01_lot_sequencing::{FileBackedKVStore, InMemoryKVStore};
