//! Lot number reassignment (`renumber`).

use super::reorder::join;
use super::{commit_error, parse_auction_id, LotSequencingService};
use crate::domain::commands::{MutationOutcome, RenumberLots};
use crate::domain::errors::SequencingError;
use crate::domain::guard::{check_uniqueness, find_duplicates};
use crate::ports::outbound::{AuditLog, Clock, LotRepository, LotWrite};
use serde_json::json;
use shared_types::{AuditAction, LotId, LotNumber};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// One validated mapping. `original` is `None` when the requested original
/// is not a well-formed lot number and therefore cannot exist.
struct Mapping<'a> {
    original_raw: &'a str,
    original: Option<LotNumber>,
    new: LotNumber,
}

impl<R, A, C> LotSequencingService<R, A, C>
where
    R: LotRepository,
    A: AuditLog,
    C: Clock,
{
    pub(super) async fn renumber(&self, command: RenumberLots) -> Result<MutationOutcome, SequencingError> {
        let auction_id = parse_auction_id(&command.auction_id)?;
        let mappings = self.validate_mappings(&command)?;

        debug!(auction_id = %auction_id, mappings = mappings.len(), "Renumber request validated");

        let revision = self.repository.revision(&auction_id).await?;

        let originals: Vec<LotNumber> = mappings.iter().filter_map(|m| m.original.clone()).collect();
        let sources = self.repository.find_by_lot_numbers(&auction_id, &originals).await?;
        let mut by_number: HashMap<&LotNumber, _> = sources.iter().map(|lot| (&lot.lot_number, lot)).collect();

        let missing: Vec<String> = mappings
            .iter()
            .filter(|m| m.original.as_ref().map_or(true, |n| !by_number.contains_key(n)))
            .map(|m| m.original_raw.to_string())
            .collect();
        if !missing.is_empty() {
            warn!(auction_id = %auction_id, missing = ?missing, "Renumber references unknown lot numbers");
            return Err(SequencingError::LotNumbersNotFound { auction_id, missing });
        }

        // Every original resolved, so each mapping now has a source lot.
        let mut proposed: Vec<(LotId, LotNumber)> = Vec::with_capacity(mappings.len());
        let mut writes = Vec::with_capacity(mappings.len());
        let mut audit_mappings = Vec::with_capacity(mappings.len());
        for mapping in &mappings {
            let Some(source) = mapping.original.as_ref().and_then(|n| by_number.remove(n)) else {
                continue;
            };
            proposed.push((source.id.clone(), mapping.new.clone()));
            audit_mappings.push(json!({
                "lotId": source.id,
                "originalLotNumber": source.lot_number,
                "newLotNumber": mapping.new,
            }));
            let mut lot = source.clone();
            lot.lot_number = mapping.new.clone();
            writes.push(LotWrite::Update(lot));
        }

        let targets: Vec<LotNumber> = mappings.iter().map(|m| m.new.clone()).collect();
        let holders: Vec<(LotId, LotNumber)> = self
            .repository
            .find_by_lot_numbers(&auction_id, &targets)
            .await?
            .into_iter()
            .map(|lot| (lot.id, lot.lot_number))
            .collect();

        let report = check_uniqueness(
            proposed.iter().map(|(id, number)| (id, number)),
            holders.iter().map(|(id, number)| (id, number)),
        );
        if !report.collisions.is_empty() {
            let conflicting: Vec<String> = report.collisions.iter().map(LotNumber::to_string).collect();
            warn!(auction_id = %auction_id, conflicting = ?conflicting, "Lot numbers already in use");
            return Err(SequencingError::LotNumbersInUse { auction_id, conflicting });
        }

        let updated = writes.len();
        let revision = self
            .repository
            .commit(&auction_id, revision, writes)
            .await
            .map_err(|e| commit_error(&auction_id, e))?;

        info!(auction_id = %auction_id, updated, revision, "Lots renumbered");

        self.record_audit(
            &auction_id,
            AuditAction::LotRenumber,
            json!({ "mappings": audit_mappings, "revision": revision }),
            command.user_id.clone(),
        )
        .await;

        Ok(MutationOutcome { updated, revision })
    }

    /// Shape checks, run before any lookup: presence, format, batch size and
    /// duplicates on either side of the mapping.
    fn validate_mappings<'a>(&self, command: &'a RenumberLots) -> Result<Vec<Mapping<'a>>, SequencingError> {
        if command.mappings.is_empty() {
            return Err(SequencingError::validation("mappings must be a non-empty array"));
        }
        self.check_batch_size(command.mappings.len())?;

        let mut mappings = Vec::with_capacity(command.mappings.len());
        for entry in &command.mappings {
            let original_raw = entry.original_lot_number.trim();
            if original_raw.is_empty() {
                return Err(SequencingError::validation(
                    "Each mapping needs originalLotNumber and newLotNumber",
                ));
            }
            let new = LotNumber::parse(&entry.new_lot_number)
                .map_err(|e| SequencingError::validation(format!("Invalid newLotNumber: {e}")))?;
            mappings.push(Mapping {
                original_raw,
                original: LotNumber::parse(original_raw).ok(),
                new,
            });
        }

        let duplicates = find_duplicates(mappings.iter().map(|m| &m.new));
        if !duplicates.is_empty() {
            return Err(SequencingError::validation(format!(
                "Duplicate newLotNumber values: {}",
                join(&duplicates)
            )));
        }

        let originals: Vec<&str> = mappings.iter().map(|m| m.original_raw).collect();
        let duplicates = find_duplicates(originals.iter());
        if !duplicates.is_empty() {
            return Err(SequencingError::validation(format!(
                "Duplicate originalLotNumber values: {}",
                join(&duplicates)
            )));
        }

        Ok(mappings)
    }
}
