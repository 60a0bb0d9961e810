//! Domain types for the admin API: configuration and error mapping.

pub mod config;
pub mod error;

pub use config::{
    parse_duration, AdminApiConfig, ConfigError, CorsConfig, HttpConfig, LimitsConfig, TimeoutConfig,
};
pub use error::{ApiError, ApiServiceError, INTERNAL_ERROR_MESSAGE};
