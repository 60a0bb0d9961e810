//! Inbound Ports (Driving Ports / API)

use crate::domain::commands::{CreateLot, MutationOutcome, RenumberLots, ReorderLots};
use crate::domain::errors::SequencingError;
use async_trait::async_trait;
use shared_types::Lot;

/// Primary Lot Sequencing API.
#[async_trait]
pub trait LotSequencingApi: Send + Sync {
    /// Rewrite display sequences of lots in one auction.
    ///
    /// 1. Validates the request shape
    /// 2. Resolves every lot id inside the auction
    /// 3. Guards sequence uniqueness against untouched lots
    /// 4. Commits one batch against the revision read in step 2
    /// 5. Records a `lot_reorder` audit entry
    async fn reorder_lots(&self, command: ReorderLots) -> Result<MutationOutcome, SequencingError>;

    /// Rewrite lot numbers of lots in one auction.
    ///
    /// Swaps and longer cycles are allowed; the final numbering must be unique.
    async fn renumber_lots(&self, command: RenumberLots) -> Result<MutationOutcome, SequencingError>;

    /// Register a new, unsequenced lot.
    async fn create_lot(&self, command: CreateLot) -> Result<Lot, SequencingError>;

    /// Lots of an auction in listing order.
    async fn list_lots(&self, auction_id: &str) -> Result<Vec<Lot>, SequencingError>;
}
