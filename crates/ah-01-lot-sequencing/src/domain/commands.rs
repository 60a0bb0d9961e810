//! # Commands
//!
//! Request shapes accepted by the sequencing API. Fields arrive as raw
//! strings and numbers; the service validates them into domain types so that
//! every rejection surfaces as a `SequencingError::Validation` with a readable
//! message rather than a deserialization failure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Explicit sequence assignment for one lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceUpdate {
    pub lot_id: String,
    pub sequence: i64,
}

/// Reassign display positions of lots in an auction.
///
/// Either `order` (position N gets sequence N+1) or `updates` must be
/// non-empty. When both are present `order` wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReorderLots {
    pub auction_id: String,
    pub order: Vec<String>,
    pub updates: Vec<SequenceUpdate>,
    pub user_id: Option<String>,
}

/// One old→new lot number reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotNumberMapping {
    pub original_lot_number: String,
    pub new_lot_number: String,
}

/// Reassign lot numbers in an auction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenumberLots {
    pub auction_id: String,
    pub mappings: Vec<LotNumberMapping>,
    pub user_id: Option<String>,
}

/// Register a lot in an auction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateLot {
    pub auction_id: String,
    pub lot_number: String,
    pub title: String,
    pub estimate_low: Option<u64>,
    pub estimate_high: Option<u64>,
    pub starting_bid: Option<u64>,
    pub attributes: BTreeMap<String, String>,
}

/// Result of a committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Number of lots written.
    pub updated: usize,
    /// Auction revision after the commit.
    pub revision: u64,
}
