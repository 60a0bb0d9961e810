//! # Auction Admin Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # End-to-end flows through the admin router
//!     ├── harness.rs    # Router + repository fixture
//!     ├── http_flows.rs # Reorder, renumber and error mapping over HTTP
//!     ├── concurrency.rs# Racing mutations on one auction
//!     └── persistence.rs# File store restarts and schema migration
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ah-tests
//!
//! # Benchmarks
//! cargo bench -p ah-tests
//! ```

pub mod integration;
