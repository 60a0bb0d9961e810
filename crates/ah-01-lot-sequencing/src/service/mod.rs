//! # Lot Sequencing Service
//!
//! The application service implementing `LotSequencingApi`.
//!
//! ## Architecture
//!
//! This service:
//! 1. Validates requests into domain types before touching storage
//! 2. Resolves lots scoped to the auction and runs the uniqueness guard
//! 3. Commits one batch per request against the auction revision it read
//! 4. Records an audit entry after every committed reorder/renumber
//!
//! All collaborators are injected through [`LotSequencingDependencies`].

mod catalog;
mod renumber;
mod reorder;

use crate::config::SequencingConfig;
use crate::domain::commands::{CreateLot, MutationOutcome, RenumberLots, ReorderLots};
use crate::domain::errors::{RepositoryError, SequencingError};
use crate::ports::inbound::LotSequencingApi;
use crate::ports::outbound::{AuditLog, Clock, LotRepository};
use async_trait::async_trait;
use shared_types::{AuctionId, AuditAction, AuditEntry, Lot};
use tracing::{error, warn};

/// The Lot Sequencing Service.
pub struct LotSequencingService<R, A, C>
where
    R: LotRepository,
    A: AuditLog,
    C: Clock,
{
    /// Lot persistence.
    pub(crate) repository: R,
    /// Audit trail for committed mutations.
    pub(crate) audit: A,
    /// Time source for `sequencedAt`, `createdAt` and audit timestamps.
    pub(crate) clock: C,
    pub(crate) config: SequencingConfig,
}

/// Dependencies for LotSequencingService
pub struct LotSequencingDependencies<R, A, C> {
    pub repository: R,
    pub audit: A,
    pub clock: C,
}

impl<R, A, C> LotSequencingService<R, A, C>
where
    R: LotRepository,
    A: AuditLog,
    C: Clock,
{
    pub fn new(deps: LotSequencingDependencies<R, A, C>, config: SequencingConfig) -> Self {
        Self {
            repository: deps.repository,
            audit: deps.audit,
            clock: deps.clock,
            config,
        }
    }

    pub fn config(&self) -> &SequencingConfig {
        &self.config
    }

    fn check_batch_size(&self, size: usize) -> Result<(), SequencingError> {
        if size > self.config.max_batch_size {
            return Err(SequencingError::validation(format!(
                "Batch of {size} lots exceeds the limit of {}",
                self.config.max_batch_size
            )));
        }
        Ok(())
    }

    /// Record an audit entry. Failures are logged, never returned: the lot
    /// changes are already committed.
    async fn record_audit(
        &self,
        auction_id: &AuctionId,
        action: AuditAction,
        changes: serde_json::Value,
        actor_id: Option<String>,
    ) {
        let entry = AuditEntry::for_auction(auction_id.clone(), action, changes, actor_id, self.clock.now());
        if let Err(e) = self.audit.record(entry).await {
            warn!(
                auction_id = %auction_id,
                action = %action,
                error = %e,
                "Failed to record audit entry for committed change"
            );
        }
    }
}

fn parse_auction_id(raw: &str) -> Result<AuctionId, SequencingError> {
    AuctionId::parse(raw).map_err(|_| SequencingError::validation("auctionId is required"))
}

/// Translate a commit rejection into the caller-facing error.
fn commit_error(auction_id: &AuctionId, err: RepositoryError) -> SequencingError {
    match err {
        RepositoryError::RevisionMismatch { .. } | RepositoryError::LotMissing { .. } => {
            warn!(auction_id = %auction_id, error = %err, "Commit rejected, auction changed");
            SequencingError::ConcurrentModification {
                auction_id: auction_id.clone(),
            }
        }
        RepositoryError::UniqueViolation { lot_number } => {
            warn!(auction_id = %auction_id, lot_number = %lot_number, "Commit rejected, lot number taken");
            SequencingError::LotNumbersInUse {
                auction_id: auction_id.clone(),
                conflicting: vec![lot_number],
            }
        }
        other => {
            error!(auction_id = %auction_id, error = %other, "Commit failed");
            other.into()
        }
    }
}

#[async_trait]
impl<R, A, C> LotSequencingApi for LotSequencingService<R, A, C>
where
    R: LotRepository,
    A: AuditLog,
    C: Clock,
{
    async fn reorder_lots(&self, command: ReorderLots) -> Result<MutationOutcome, SequencingError> {
        self.reorder(command).await
    }

    async fn renumber_lots(&self, command: RenumberLots) -> Result<MutationOutcome, SequencingError> {
        self.renumber(command).await
    }

    async fn create_lot(&self, command: CreateLot) -> Result<Lot, SequencingError> {
        self.register(command).await
    }

    async fn list_lots(&self, auction_id: &str) -> Result<Vec<Lot>, SequencingError> {
        self.listing(auction_id).await
    }
}
