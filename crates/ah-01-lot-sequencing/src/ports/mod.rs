//! Ports layer - Hexagonal architecture interfaces

pub mod inbound;
pub mod outbound;

pub use inbound::LotSequencingApi;
pub use outbound::{
    AuditLog, BatchOperation, Clock, KeyValueStore, LotRepository, LotWrite, ScanResult, SystemClock,
};
