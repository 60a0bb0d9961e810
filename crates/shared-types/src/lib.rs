//! # Shared Types Crate
//!
//! This crate contains the auction domain entities and value objects used by
//! every other crate in the workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Lot`, `LotNumber` and `AuditEntry` are
//!   defined here and nowhere else.
//! - **Parse, don't validate**: identifiers and lot numbers are newtypes whose
//!   constructors reject malformed input, so a value of the type is always
//!   well formed.
//! - **One canonical field per concept**: estimates and starting bids have a
//!   single representation; legacy shapes are handled by the explicit schema
//!   migration in `ah-01-lot-sequencing`.

pub mod audit;
pub mod entities;
pub mod errors;
pub mod lot_number;

pub use audit::{AuditAction, AuditEntry, AUDIT_ENTITY_AUCTION};
pub use entities::*;
pub use errors::TypeError;
pub use lot_number::LotNumber;
