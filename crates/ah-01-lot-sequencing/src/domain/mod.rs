//! # Domain Layer
//!
//! Pure domain logic: commands, errors, the uniqueness guard and the lot
//! document migration. Nothing here performs I/O.

pub mod commands;
pub mod errors;
pub mod guard;
pub mod migration;

pub use commands::{
    CreateLot, LotNumberMapping, MutationOutcome, RenumberLots, ReorderLots, SequenceUpdate,
};
pub use errors::{ErrorKind, KVStoreError, RepositoryError, SequencingError};
pub use guard::{check_uniqueness, find_duplicates, UniquenessReport};
