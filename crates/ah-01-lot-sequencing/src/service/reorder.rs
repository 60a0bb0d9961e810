//! Sequence assignment (`reorder`).

use super::{commit_error, parse_auction_id, LotSequencingService};
use crate::domain::commands::{MutationOutcome, ReorderLots};
use crate::domain::errors::SequencingError;
use crate::domain::guard::{check_uniqueness, find_duplicates};
use crate::ports::outbound::{AuditLog, Clock, LotRepository, LotWrite};
use serde_json::json;
use shared_types::{AuditAction, LotId, Sequence};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

impl<R, A, C> LotSequencingService<R, A, C>
where
    R: LotRepository,
    A: AuditLog,
    C: Clock,
{
    pub(super) async fn reorder(&self, command: ReorderLots) -> Result<MutationOutcome, SequencingError> {
        let auction_id = parse_auction_id(&command.auction_id)?;
        let assignments = self.normalize_reorder(&command)?;

        debug!(
            auction_id = %auction_id,
            lots = assignments.len(),
            ordered = !command.order.is_empty(),
            "Reorder request validated"
        );

        let revision = self.repository.revision(&auction_id).await?;
        let ids: Vec<LotId> = assignments.iter().map(|(id, _)| id.clone()).collect();
        let found = self.repository.find_by_ids(&auction_id, &ids).await?;

        if found.len() != ids.len() {
            let resolved: HashSet<&LotId> = found.iter().map(|lot| &lot.id).collect();
            let lot_ids: Vec<String> = ids
                .iter()
                .filter(|id| !resolved.contains(id))
                .map(LotId::to_string)
                .collect();
            warn!(auction_id = %auction_id, unresolved = ?lot_ids, "Reorder references unknown lots");
            return Err(SequencingError::UnresolvedLots { auction_id, lot_ids });
        }

        let persisted: Vec<(LotId, Sequence)> = self
            .repository
            .list(&auction_id)
            .await?
            .into_iter()
            .filter_map(|lot| lot.sequence.map(|sequence| (lot.id, sequence)))
            .collect();
        let report = check_uniqueness(
            assignments.iter().map(|(id, sequence)| (id, sequence)),
            persisted.iter().map(|(id, sequence)| (id, sequence)),
        );
        if !report.duplicates.is_empty() {
            return Err(SequencingError::validation(format!(
                "Duplicate sequences in request: {}",
                join(&report.duplicates)
            )));
        }
        if !report.collisions.is_empty() {
            warn!(auction_id = %auction_id, conflicting = ?report.collisions, "Sequences already in use");
            return Err(SequencingError::SequencesInUse {
                auction_id,
                conflicting: report.collisions,
            });
        }

        let now = self.clock.now();
        let mut by_id: HashMap<LotId, _> = found.into_iter().map(|lot| (lot.id.clone(), lot)).collect();
        let mut writes = Vec::with_capacity(assignments.len());
        for (id, sequence) in &assignments {
            if let Some(mut lot) = by_id.remove(id) {
                lot.sequence = Some(*sequence);
                lot.last_sequenced_by_id = command.user_id.clone();
                lot.sequenced_at = Some(now);
                writes.push(LotWrite::Update(lot));
            }
        }

        let updated = writes.len();
        let revision = self
            .repository
            .commit(&auction_id, revision, writes)
            .await
            .map_err(|e| commit_error(&auction_id, e))?;

        info!(auction_id = %auction_id, updated, revision, "Lots reordered");

        let updates: Vec<_> = assignments
            .iter()
            .map(|(id, sequence)| json!({ "lotId": id, "sequence": sequence }))
            .collect();
        self.record_audit(
            &auction_id,
            AuditAction::LotReorder,
            json!({ "updates": updates, "revision": revision }),
            command.user_id,
        )
        .await;

        Ok(MutationOutcome { updated, revision })
    }

    /// Validate the request and flatten it to `(lot, sequence)` pairs.
    ///
    /// The ordered form assigns `position + 1`. It takes precedence when both
    /// forms are supplied.
    fn normalize_reorder(&self, command: &ReorderLots) -> Result<Vec<(LotId, Sequence)>, SequencingError> {
        let raw: Vec<(&str, i64)> = if !command.order.is_empty() {
            command
                .order
                .iter()
                .zip(1i64..)
                .map(|(id, position)| (id.as_str(), position))
                .collect()
        } else if !command.updates.is_empty() {
            command
                .updates
                .iter()
                .map(|update| (update.lot_id.as_str(), update.sequence))
                .collect()
        } else {
            return Err(SequencingError::validation(
                "Either order or updates must be a non-empty array",
            ));
        };

        self.check_batch_size(raw.len())?;

        let mut assignments = Vec::with_capacity(raw.len());
        for (id, sequence) in raw {
            let lot_id = LotId::parse(id)?;
            if sequence < 1 {
                return Err(SequencingError::validation(format!(
                    "Sequence for lot {lot_id} must be a positive integer, got {sequence}"
                )));
            }
            let sequence = Sequence::try_from(sequence).map_err(|_| {
                SequencingError::validation(format!("Sequence {sequence} for lot {lot_id} is out of range"))
            })?;
            assignments.push((lot_id, sequence));
        }

        let duplicates = find_duplicates(assignments.iter().map(|(id, _)| id));
        if !duplicates.is_empty() {
            return Err(SequencingError::validation(format!(
                "Duplicate lot ids in request: {}",
                join(&duplicates)
            )));
        }

        Ok(assignments)
    }
}

pub(super) fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(T::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
