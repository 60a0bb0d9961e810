//! Lot registration and listing.

use super::{commit_error, parse_auction_id, LotSequencingService};
use crate::domain::commands::CreateLot;
use crate::domain::errors::SequencingError;
use crate::ports::outbound::{AuditLog, Clock, LotRepository, LotWrite};
use shared_types::{listing_order, AttributeKey, Estimate, Lot, LotAttributes, LotNumber};
use std::collections::BTreeSet;
use tracing::{info, warn};

impl<R, A, C> LotSequencingService<R, A, C>
where
    R: LotRepository,
    A: AuditLog,
    C: Clock,
{
    pub(super) async fn register(&self, command: CreateLot) -> Result<Lot, SequencingError> {
        let auction_id = parse_auction_id(&command.auction_id)?;
        let lot_number = LotNumber::parse(&command.lot_number)?;

        let title = command.title.trim();
        if title.is_empty() {
            return Err(SequencingError::validation("title must not be empty"));
        }
        let estimate = Estimate::new(command.estimate_low, command.estimate_high)?;

        let mut attributes = LotAttributes::new();
        for (key, value) in command.attributes {
            attributes.insert(AttributeKey::parse(&key)?, value);
        }

        let revision = self.repository.revision(&auction_id).await?;
        let taken = self
            .repository
            .find_by_lot_numbers(&auction_id, std::slice::from_ref(&lot_number))
            .await?;
        if !taken.is_empty() {
            warn!(auction_id = %auction_id, lot_number = %lot_number, "Lot number already in use");
            return Err(SequencingError::LotNumbersInUse {
                auction_id,
                conflicting: vec![lot_number.to_string()],
            });
        }

        let lot = Lot::new(auction_id.clone(), lot_number, title, self.clock.now())
            .with_estimate(estimate)
            .with_starting_bid(command.starting_bid)
            .with_attributes(attributes);

        let revision = self
            .repository
            .commit(&auction_id, revision, vec![LotWrite::Insert(lot.clone())])
            .await
            .map_err(|e| commit_error(&auction_id, e))?;

        let namespaces: BTreeSet<&str> =
            lot.attributes.keys().map(AttributeKey::namespace).collect();
        info!(
            auction_id = %auction_id,
            lot_id = %lot.id,
            lot_number = %lot.lot_number,
            attribute_namespaces = ?namespaces,
            revision,
            "Lot registered"
        );
        Ok(lot)
    }

    pub(super) async fn listing(&self, auction_id: &str) -> Result<Vec<Lot>, SequencingError> {
        let auction_id = parse_auction_id(auction_id)?;
        let mut lots = self.repository.list(&auction_id).await?;
        lots.sort_by(listing_order);
        Ok(lots)
    }
}
