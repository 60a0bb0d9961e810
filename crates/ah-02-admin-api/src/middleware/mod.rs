//! Middleware stack for the admin API.
//!
//! Order (outer to inner):
//! 1. CORS - preflight and response headers
//! 2. Tracing - request span and request id
//! 3. Timeout - per-request time bound

pub mod cors;
pub mod timeout;
pub mod tracing;

pub use cors::create_cors_layer;
pub use timeout::{TimeoutLayer, TimeoutService};
pub use self::tracing::{TracingLayer, TracingService, REQUEST_ID_HEADER};
