//! # Lot Document Schema Migration
//!
//! Stored lot documents carry a `schemaVersion`. Documents without one are
//! version 1.
//!
//! ## Version 1 → 2
//!
//! | v1 field(s) | v2 field |
//! |-------------|----------|
//! | `estimateLow` | `estimate.low` |
//! | `estimateHigh`, legacy `estimatedValue` | `estimate.high` |
//! | `startingBid`, legacy `startingPrice` | `startingBid` |
//! | `metadata` (free-form object) | `attributes` under the `legacy.` namespace |
//!
//! The current field wins when both spellings are present. Legacy names are
//! removed. Migration is idempotent: a v2 document is returned unchanged.

use serde_json::{Map, Value};
use shared_types::Estimate;
use thiserror::Error;

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Field carrying the schema version inside a stored document.
pub const SCHEMA_VERSION_FIELD: &str = "schemaVersion";

/// Namespace given to attributes carried over from free-form metadata.
pub const LEGACY_ATTRIBUTE_NAMESPACE: &str = "legacy";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    #[error("lot document is not a JSON object")]
    NotAnObject,

    #[error("unsupported schema version {found} (newest known is {CURRENT_SCHEMA_VERSION})")]
    UnsupportedVersion { found: u32 },

    #[error("field '{field}' {message}")]
    InvalidField { field: &'static str, message: String },
}

/// Schema version of a stored document (missing means 1).
pub fn schema_version(doc: &Value) -> u32 {
    doc.get(SCHEMA_VERSION_FIELD)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(1)
}

/// Bring a document to `CURRENT_SCHEMA_VERSION`.
///
/// Returns the migrated document and whether anything changed.
pub fn migrate_document(doc: Value) -> Result<(Value, bool), MigrationError> {
    let version = schema_version(&doc);
    if version == CURRENT_SCHEMA_VERSION {
        return Ok((doc, false));
    }
    if version > CURRENT_SCHEMA_VERSION {
        return Err(MigrationError::UnsupportedVersion { found: version });
    }

    let Value::Object(mut fields) = doc else {
        return Err(MigrationError::NotAnObject);
    };

    v1_to_v2(&mut fields)?;
    fields.insert(SCHEMA_VERSION_FIELD.into(), Value::from(CURRENT_SCHEMA_VERSION));
    Ok((Value::Object(fields), true))
}

fn v1_to_v2(fields: &mut Map<String, Value>) -> Result<(), MigrationError> {
    let low = take_amount(fields, "estimateLow")?;
    let high = take_amount(fields, "estimateHigh")?;
    let legacy_high = take_amount(fields, "estimatedValue")?;
    let starting_bid = take_amount(fields, "startingBid")?;
    let legacy_starting = take_amount(fields, "startingPrice")?;

    let folded = Estimate::new(low, high.or(legacy_high)).map_err(|e| MigrationError::InvalidField {
        field: "estimate",
        message: e.to_string(),
    })?;
    let mut estimate = Map::new();
    if let Some(low) = folded.low {
        estimate.insert("low".into(), Value::from(low));
    }
    if let Some(high) = folded.high {
        estimate.insert("high".into(), Value::from(high));
    }
    if !estimate.is_empty() {
        fields.insert("estimate".into(), Value::Object(estimate));
    }

    if let Some(bid) = starting_bid.or(legacy_starting) {
        fields.insert("startingBid".into(), Value::from(bid));
    }

    if let Some(metadata) = fields.remove("metadata") {
        let attributes = legacy_attributes(metadata)?;
        if !attributes.is_empty() {
            let target = fields
                .entry("attributes")
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(existing) = target else {
                return Err(MigrationError::InvalidField {
                    field: "attributes",
                    message: "is not an object".into(),
                });
            };
            for (key, value) in attributes {
                existing.entry(key).or_insert(value);
            }
        }
    }

    Ok(())
}

/// Remove `field` and read it as a non-negative integer amount.
///
/// Legacy writers stored amounts as numbers or numeric strings; fractional
/// values are rounded to the nearest minor unit.
fn take_amount(fields: &mut Map<String, Value>, field: &'static str) -> Result<Option<u64>, MigrationError> {
    let invalid = |message: &str| MigrationError::InvalidField {
        field,
        message: message.to_string(),
    };

    match fields.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                Ok(Some(v))
            } else {
                match n.as_f64() {
                    Some(f) if f >= 0.0 && f.is_finite() => Ok(Some(f.round() as u64)),
                    _ => Err(invalid("is not a non-negative amount")),
                }
            }
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| *f >= 0.0 && f.is_finite())
                .map(|f| Some(f.round() as u64))
                .ok_or_else(|| invalid("is not a numeric amount"))
        }
        Some(_) => Err(invalid("has an unexpected type")),
    }
}

/// Flatten a free-form metadata object into `legacy.*` attributes.
fn legacy_attributes(metadata: Value) -> Result<Map<String, Value>, MigrationError> {
    let Value::Object(entries) = metadata else {
        return match metadata {
            Value::Null => Ok(Map::new()),
            _ => Err(MigrationError::InvalidField {
                field: "metadata",
                message: "is not an object".into(),
            }),
        };
    };

    let mut attributes = Map::new();
    for (key, value) in entries {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            other => other.to_string(),
        };
        attributes.insert(
            format!("{LEGACY_ATTRIBUTE_NAMESPACE}.{}", normalize_key(&key)),
            Value::String(text),
        );
    }
    Ok(attributes)
}

/// Lowercase, map anything outside `[a-z0-9_]` to `_`, ensure a leading letter.
fn normalize_key(raw: &str) -> String {
    let mut key: String = raw
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !key.starts_with(|c: char| c.is_ascii_lowercase()) {
        key.insert_str(0, "k_");
    }
    key
}
