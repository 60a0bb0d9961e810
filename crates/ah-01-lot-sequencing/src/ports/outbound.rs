//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Lot Sequencing service. The host application
//! wires concrete adapters in at startup.

use crate::domain::errors::{KVStoreError, RepositoryError};
use async_trait::async_trait;
use shared_types::{AuctionId, AuditEntry, Lot, LotId, LotNumber, Timestamp};

/// Key-value pairs returned by a prefix scan, in ascending key order.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for key-value database operations.
///
/// Production: `RocksDbStore` (admin-runtime/adapters/storage/rocksdb_adapter.rs)
/// or `FileBackedKVStore`. Testing: `InMemoryKVStore`.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch are applied, in order, or NONE are.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// All pairs whose key starts with `prefix`, sorted by key.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// One lot write inside a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotWrite {
    /// A new lot. Its lot number must not be indexed yet.
    Insert(Lot),
    /// Replacement document for a lot that already belongs to the auction.
    Update(Lot),
}

impl LotWrite {
    pub fn lot(&self) -> &Lot {
        match self {
            LotWrite::Insert(lot) | LotWrite::Update(lot) => lot,
        }
    }
}

/// Persistence of lot documents scoped by auction.
///
/// Every read and write is scoped to one auction; a lot id that exists under a
/// different auction is invisible.
#[async_trait]
pub trait LotRepository: Send + Sync {
    /// Current revision of the auction (0 when nothing was ever committed).
    async fn revision(&self, auction_id: &AuctionId) -> Result<u64, RepositoryError>;

    /// Lots of the auction with the given ids. Unknown ids are omitted.
    async fn find_by_ids(&self, auction_id: &AuctionId, ids: &[LotId]) -> Result<Vec<Lot>, RepositoryError>;

    /// Lots of the auction currently holding any of `numbers`.
    async fn find_by_lot_numbers(
        &self,
        auction_id: &AuctionId,
        numbers: &[LotNumber],
    ) -> Result<Vec<Lot>, RepositoryError>;

    /// Every lot of the auction, unordered.
    async fn list(&self, auction_id: &AuctionId) -> Result<Vec<Lot>, RepositoryError>;

    /// Apply `writes` atomically if the auction is still at `expected_revision`.
    ///
    /// Returns the new revision.
    ///
    /// ## Errors
    ///
    /// - `RevisionMismatch`: another commit landed first
    /// - `LotMissing`: an update targets a lot outside the auction
    /// - `UniqueViolation`: a lot number would be indexed twice
    async fn commit(
        &self,
        auction_id: &AuctionId,
        expected_revision: u64,
        writes: Vec<LotWrite>,
    ) -> Result<u64, RepositoryError>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<(), RepositoryError>;

    /// Entries for the auction, oldest first.
    async fn entries_for(&self, auction_id: &AuctionId) -> Result<Vec<AuditEntry>, RepositoryError>;
}

/// Abstract interface for time operations (for testability).
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now()
    }
}
