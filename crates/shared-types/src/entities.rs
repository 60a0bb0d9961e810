//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `AuctionId`, `LotId`
//! - **Catalog**: `Lot`, `Estimate`, `LotAttributes`

use crate::errors::TypeError;
use crate::lot_number::LotNumber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Wall-clock timestamp used for provenance fields.
pub type Timestamp = DateTime<Utc>;

/// Display position of a lot inside its auction. Starts at 1.
pub type Sequence = u32;

/// Maximum accepted identifier length.
pub const MAX_ID_LEN: usize = 128;

fn validate_id(raw: &str, kind: &'static str) -> Result<String, TypeError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(TypeError::EmptyIdentifier { kind });
    }
    if value.len() > MAX_ID_LEN {
        return Err(TypeError::IdentifierTooLong {
            kind,
            max: MAX_ID_LEN,
        });
    }
    Ok(value.to_string())
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Identifier of an auction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuctionId(String);

impl AuctionId {
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        validate_id(raw, "auction id").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Internal identifier of a lot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LotId(String);

impl LotId {
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        validate_id(raw, "lot id").map(Self)
    }

    /// Generate a fresh, time-ordered identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_newtype_conversions {
    ($ty:ident) => {
        impl TryFrom<String> for $ty {
            type Error = TypeError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_newtype_conversions!(AuctionId);
string_newtype_conversions!(LotId);

// =============================================================================
// CATALOG
// =============================================================================

/// Pre-sale estimate in minor currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<u64>,
}

impl Estimate {
    /// Build an estimate, rejecting `low > high`.
    pub fn new(low: Option<u64>, high: Option<u64>) -> Result<Self, TypeError> {
        if let (Some(low), Some(high)) = (low, high) {
            if low > high {
                return Err(TypeError::InvertedEstimate { low, high });
            }
        }
        Ok(Self { low, high })
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }
}

/// Namespaced attribute key, `namespace.name` in lowercase ASCII.
///
/// Examples: `art.medium`, `wine.vintage`, `provenance.previous_owner`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttributeKey(String);

impl AttributeKey {
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidAttributeKey {
            key: raw.to_string(),
        };

        let (namespace, name) = raw.split_once('.').ok_or_else(invalid)?;
        let segment_ok = |s: &str| {
            s.bytes().next().is_some_and(|b| b.is_ascii_lowercase())
                && s
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
        };
        if !segment_ok(namespace) || !segment_ok(name) || raw.len() > MAX_ID_LEN {
            return Err(invalid());
        }
        Ok(Self(raw.to_string()))
    }

    pub fn namespace(&self) -> &str {
        self.0.split_once('.').map(|(ns, _)| ns).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

string_newtype_conversions!(AttributeKey);

/// Free-form descriptive attributes of a lot, keyed by namespaced keys.
pub type LotAttributes = BTreeMap<AttributeKey, String>;

/// A single item offered within an auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: LotId,
    pub auction_id: AuctionId,
    pub lot_number: LotNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Sequence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sequenced_by_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequenced_at: Option<Timestamp>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Estimate::is_empty")]
    pub estimate: Estimate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_bid: Option<u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: LotAttributes,
    pub created_at: Timestamp,
}

impl Lot {
    /// Create an unsequenced lot.
    pub fn new(
        auction_id: AuctionId,
        lot_number: LotNumber,
        title: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: LotId::generate(),
            auction_id,
            lot_number,
            sequence: None,
            last_sequenced_by_id: None,
            sequenced_at: None,
            title: title.into(),
            estimate: Estimate::default(),
            starting_bid: None,
            attributes: LotAttributes::new(),
            created_at,
        }
    }

    pub fn with_id(mut self, id: LotId) -> Self {
        self.id = id;
        self
    }

    pub fn with_sequence(mut self, sequence: Sequence) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn with_estimate(mut self, estimate: Estimate) -> Self {
        self.estimate = estimate;
        self
    }

    pub fn with_starting_bid(mut self, starting_bid: Option<u64>) -> Self {
        self.starting_bid = starting_bid;
        self
    }

    pub fn with_attributes(mut self, attributes: LotAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Presentation order: sequenced lots by sequence, then the rest by lot number.
pub fn listing_order(a: &Lot, b: &Lot) -> std::cmp::Ordering {
    match (a.sequence, b.sequence) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.lot_number.cmp(&b.lot_number)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.lot_number.cmp(&b.lot_number),
    }
}
