//! # Domain Errors
//!
//! Error types for the Lot Sequencing subsystem.
//!
//! ## Taxonomy
//!
//! | Kind | Meaning | Raised |
//! |------|---------|--------|
//! | Validation | malformed or incomplete request | before any read |
//! | Reference | requested lot ids do not resolve in the auction | before any write |
//! | NotFound | named lot numbers do not exist in the auction | before any write |
//! | Conflict | result would break a uniqueness invariant, or the auction moved | before/at commit |
//! | Internal | storage failure | anywhere |

use shared_types::{AuctionId, TypeError};
use thiserror::Error;

/// Coarse classification used by transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Reference,
    NotFound,
    Conflict,
    Internal,
}

/// Errors returned by the sequencing operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencingError {
    /// Request is malformed or incomplete.
    #[error("{0}")]
    Validation(String),

    /// Requested lot ids are not lots of this auction.
    #[error("Lots not found in auction {auction_id}: {}", .lot_ids.join(", "))]
    UnresolvedLots {
        auction_id: AuctionId,
        lot_ids: Vec<String>,
    },

    /// Original lot numbers do not exist in this auction.
    #[error("Lot numbers not found in auction {auction_id}: {}", .missing.join(", "))]
    LotNumbersNotFound {
        auction_id: AuctionId,
        missing: Vec<String>,
    },

    /// Target lot numbers are held by lots outside the request.
    #[error("Lot numbers already in use in auction {auction_id}: {}", .conflicting.join(", "))]
    LotNumbersInUse {
        auction_id: AuctionId,
        conflicting: Vec<String>,
    },

    /// Target sequences are held by lots outside the request.
    #[error("Sequences already in use in auction {auction_id}: {}", join_numbers(.conflicting))]
    SequencesInUse {
        auction_id: AuctionId,
        conflicting: Vec<u32>,
    },

    /// The auction changed between validation and commit.
    #[error("Auction {auction_id} was modified concurrently; reload and retry")]
    ConcurrentModification { auction_id: AuctionId },

    /// Storage failure. The message is for logs, not for clients.
    #[error("Storage failure: {0}")]
    Storage(String),
}

fn join_numbers(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl SequencingError {
    pub fn validation(message: impl Into<String>) -> Self {
        SequencingError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SequencingError::Validation(_) => ErrorKind::Validation,
            SequencingError::UnresolvedLots { .. } => ErrorKind::Reference,
            SequencingError::LotNumbersNotFound { .. } => ErrorKind::NotFound,
            SequencingError::LotNumbersInUse { .. }
            | SequencingError::SequencesInUse { .. }
            | SequencingError::ConcurrentModification { .. } => ErrorKind::Conflict,
            SequencingError::Storage(_) => ErrorKind::Internal,
        }
    }
}

impl From<TypeError> for SequencingError {
    fn from(err: TypeError) -> Self {
        SequencingError::Validation(err.to_string())
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

/// Errors raised by the lot repository and audit log ports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The auction revision moved since it was read.
    #[error("revision mismatch: expected {expected}, found {actual}")]
    RevisionMismatch { expected: u64, actual: u64 },

    /// An update targets a lot that is not in the auction.
    #[error("lot {lot_id} does not belong to the auction")]
    LotMissing { lot_id: String },

    /// The `(auction, lot number)` index already holds this number.
    #[error("lot number {lot_number} is already indexed")]
    UniqueViolation { lot_number: String },

    /// A stored document could not be decoded.
    #[error("corrupt document at {key}: {message}")]
    Corrupt { key: String, message: String },

    /// A stored document predates the current schema and needs migration.
    #[error("document at {key} has schema version {found}, expected {expected}; run the migration")]
    OutdatedSchema { key: String, found: u32, expected: u32 },

    #[error(transparent)]
    Store(#[from] KVStoreError),
}

impl From<RepositoryError> for SequencingError {
    fn from(err: RepositoryError) -> Self {
        SequencingError::Storage(err.to_string())
    }
}
