//! # Admin API (ah-02)
//!
//! HTTP surface of the lot sequencing subsystem.
//!
//! ## Endpoints
//!
//! | Method & path | Operation |
//! |---------------|-----------|
//! | `PUT /api/admin/lots/reorder` | reassign display sequences |
//! | `POST /api/admin/lots/renumber` | reassign lot numbers |
//! | `POST /api/admin/lots` | register a lot |
//! | `GET /api/admin/lots?auctionId=` | list lots in display order |
//! | `GET /health` | liveness |
//!
//! Successful mutations answer `{"success": true, "updated": n}`. Every
//! failure answers `{"success": false, "error": "..."}`.
//!
//! ## Middleware Stack
//!
//! ```text
//! CORS → Tracing (admin_request span, x-request-id) → Timeout → body limit → handler
//! ```

pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

pub use domain::config::{AdminApiConfig, CorsConfig, HttpConfig, LimitsConfig, TimeoutConfig};
pub use domain::error::{ApiError, ApiServiceError};
pub use router::{create_router, AppState};
pub use service::AdminApiService;
