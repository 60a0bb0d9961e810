//! Adapters wiring concrete infrastructure into the sequencing ports.

pub mod storage;
