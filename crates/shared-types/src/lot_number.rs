//! # Lot Numbers
//!
//! Human-facing catalog identifiers: a numeric prefix optionally followed by
//! an alphabetic suffix ("12", "12A"). Unique within an auction.
//!
//! Ordering is natural rather than lexicographic: the numeric prefix compares
//! by value, then the suffix case-insensitively, so `2 < 10 < 10A < 10b < 11`.

use crate::errors::TypeError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Maximum accepted lot number length.
pub const MAX_LOT_NUMBER_LEN: usize = 32;

/// A validated lot number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LotNumber(String);

impl LotNumber {
    /// Parse a lot number, trimming surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(TypeError::EmptyIdentifier { kind: "lot number" });
        }
        if value.len() > MAX_LOT_NUMBER_LEN {
            return Err(TypeError::IdentifierTooLong {
                kind: "lot number",
                max: MAX_LOT_NUMBER_LEN,
            });
        }

        let digits = value.bytes().take_while(u8::is_ascii_digit).count();
        let suffix_ok = value[digits..].bytes().all(|b| b.is_ascii_alphabetic());
        if digits == 0 || !suffix_ok {
            return Err(TypeError::InvalidLotNumber {
                value: value.to_string(),
            });
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric prefix with leading zeros stripped ("007A" -> "7").
    fn numeric_part(&self) -> &str {
        let digits = self.0.bytes().take_while(u8::is_ascii_digit).count();
        let trimmed = self.0[..digits].trim_start_matches('0');
        if trimmed.is_empty() {
            "0"
        } else {
            trimmed
        }
    }

    /// Alphabetic suffix, empty when absent.
    pub fn suffix(&self) -> &str {
        let digits = self.0.bytes().take_while(u8::is_ascii_digit).count();
        &self.0[digits..]
    }
}

impl Ord for LotNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        // Compare digit strings by length first so arbitrarily long prefixes
        // never overflow an integer.
        let (a, b) = (self.numeric_part(), other.numeric_part());
        a.len()
            .cmp(&b.len())
            .then_with(|| a.cmp(b))
            .then_with(|| {
                self.suffix()
                    .to_ascii_lowercase()
                    .cmp(&other.suffix().to_ascii_lowercase())
            })
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for LotNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<String> for LotNumber {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LotNumber> for String {
    fn from(value: LotNumber) -> Self {
        value.0
    }
}

impl fmt::Display for LotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
