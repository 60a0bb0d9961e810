//! # Lot Sequencing (ah-01)
//!
//! Display-order and lot-number consistency for the lots of an auction.
//!
//! ## Operations
//!
//! ```text
//! reorder  ─┐                         ┌─ lot/{auction}/{lot}
//!           ├─→ validate → guard ─→ commit(revision) ─→ lotno/{auction}/{number}
//! renumber ─┘                         └─ rev/{auction}
//!                                           ↓
//!                                      audit/{auction}/...
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Lot numbers unique per auction | guard before write, index check at commit |
//! | Sequences unique per auction after reorder | guard before write |
//! | All-or-nothing mutations | one atomic batch per request |
//! | No lost updates | commit compares the auction revision read during validation |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - commands, errors, uniqueness guard, schema migration
//! - `ports/` - `LotSequencingApi` (inbound), repository/audit/store/clock (outbound)
//! - `service/` - application service implementing the API
//! - `adapters/` - key-value stores and the KV-backed repository
//!
//! ## Usage
//!
//! ```ignore
//! use ah_01_lot_sequencing::{
//!     InMemoryKVStore, KvLotRepository, LotSequencingApi, LotSequencingDependencies,
//!     LotSequencingService, ReorderLots, SequencingConfig, SystemClock,
//! };
//!
//! let repository = KvLotRepository::new(InMemoryKVStore::new());
//! let service = LotSequencingService::new(
//!     LotSequencingDependencies {
//!         repository: repository.clone(),
//!         audit: repository,
//!         clock: SystemClock,
//!     },
//!     SequencingConfig::default(),
//! );
//!
//! let outcome = service.reorder_lots(ReorderLots {
//!     auction_id: "spring-sale".into(),
//!     order: vec!["lot-b".into(), "lot-a".into()],
//!     ..Default::default()
//! }).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryKVStore, KvLotRepository, MigrationReport};
#[cfg(feature = "file-store")]
pub use adapters::FileBackedKVStore;
pub use config::SequencingConfig;
pub use domain::commands::{
    CreateLot, LotNumberMapping, MutationOutcome, RenumberLots, ReorderLots, SequenceUpdate,
};
pub use domain::errors::{ErrorKind, KVStoreError, RepositoryError, SequencingError};
pub use ports::inbound::LotSequencingApi;
pub use ports::outbound::{
    AuditLog, BatchOperation, Clock, KeyValueStore, LotRepository, LotWrite, ScanResult, SystemClock,
};
pub use service::{LotSequencingDependencies, LotSequencingService};
