//! # Audit Entries
//!
//! One record per successful lot mutation, consumed by an external history
//! viewer.

use crate::entities::{AuctionId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity type recorded for lot sequencing changes.
pub const AUDIT_ENTITY_AUCTION: &str = "Auction";

/// Kind of change recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    LotReorder,
    LotRenumber,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::LotReorder => "lot_reorder",
            AuditAction::LotRenumber => "lot_renumber",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded change to an auction's lots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub entity_type: String,
    pub entity_id: AuctionId,
    pub action: AuditAction,
    /// Full payload of the applied changes.
    pub changes: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    pub recorded_at: Timestamp,
}

impl AuditEntry {
    /// Audit entry for a change to `auction_id`.
    pub fn for_auction(
        auction_id: AuctionId,
        action: AuditAction,
        changes: serde_json::Value,
        actor_id: Option<String>,
        recorded_at: Timestamp,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            entity_type: AUDIT_ENTITY_AUCTION.to_string(),
            entity_id: auction_id,
            action,
            changes,
            actor_id,
            recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_action_tags() {
        assert_eq!(AuditAction::LotReorder.to_string(), "lot_reorder");
        assert_eq!(
            serde_json::to_value(AuditAction::LotRenumber).unwrap(),
            "lot_renumber"
        );
    }

    #[test]
    fn test_entry_targets_auction() {
        let entry = AuditEntry::for_auction(
            AuctionId::parse("a-9").unwrap(),
            AuditAction::LotReorder,
            serde_json::json!([{"lotId": "x", "sequence": 1}]),
            Some("user-1".into()),
            Utc::now(),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["entityType"], "Auction");
        assert_eq!(json["entityId"], "a-9");
        assert_eq!(json["action"], "lot_reorder");
        assert_eq!(json["actorId"], "user-1");
    }
}
