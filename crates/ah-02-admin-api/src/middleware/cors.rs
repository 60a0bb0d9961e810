//! CORS middleware.
//!
//! Builds a tower-http CORS layer from the admin API configuration.

use crate::domain::config::CorsConfig;
use axum::http::{HeaderName, Method};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

fn wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v == "*")
}

fn parse_all<T: std::str::FromStr>(values: &[String]) -> Vec<T> {
    values.iter().filter_map(|v| v.parse().ok()).collect()
}

/// Create CORS layer from admin API config
pub fn create_cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        // Same-origin only: no CORS headers are added.
        return CorsLayer::new();
    }

    let mut cors = CorsLayer::new();

    if wildcard(&config.allowed_origins) {
        cors = cors.allow_origin(Any);
    } else {
        cors = cors.allow_origin(parse_all::<axum::http::HeaderValue>(&config.allowed_origins));
    }

    cors = cors.allow_methods(parse_all::<Method>(&config.allowed_methods));

    if wildcard(&config.allowed_headers) {
        cors = cors.allow_headers(Any);
    } else {
        cors = cors.allow_headers(parse_all::<HeaderName>(&config.allowed_headers));
    }

    if !config.expose_headers.is_empty() {
        cors = cors.expose_headers(parse_all::<HeaderName>(&config.expose_headers));
    }

    cors = cors.max_age(Duration::from_secs(config.max_age));

    if config.allow_credentials {
        cors = cors.allow_credentials(true);
    }

    cors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_skips_invalid_entries() {
        let methods = parse_all::<Method>(&["GET".into(), "not a method".into(), "PUT".into()]);
        assert_eq!(methods, vec![Method::GET, Method::PUT]);
    }

    #[test]
    fn test_explicit_origins_with_credentials() {
        let config = CorsConfig {
            allowed_origins: vec!["https://admin.example.com".to_string()],
            allow_credentials: true,
            ..CorsConfig::default()
        };
        // Building must not panic for a valid credentials setup.
        drop(create_cors_layer(&config));
    }
}
