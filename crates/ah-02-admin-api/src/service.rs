//! Admin API service - binds the listener and serves the router.

use crate::domain::config::AdminApiConfig;
use crate::domain::error::ApiServiceError;
use crate::router::{create_router, AppState};
use ah_01_lot_sequencing::LotSequencingApi;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Admin API service state
pub struct AdminApiService {
    config: AdminApiConfig,
    state: AppState,
}

impl AdminApiService {
    /// Create a new admin API service around a sequencing implementation.
    pub fn new(
        config: AdminApiConfig,
        api: Arc<dyn LotSequencingApi>,
    ) -> Result<Self, ApiServiceError> {
        config
            .validate()
            .map_err(|e| ApiServiceError::Config(e.to_string()))?;

        Ok(Self {
            config,
            state: AppState::new(api),
        })
    }

    pub fn config(&self) -> &AdminApiConfig {
        &self.config
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        create_router(self.state.clone(), &self.config)
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ApiServiceError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiServiceError::Bind(format!("{addr}: {e}")))?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ApiServiceError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ApiServiceError::Bind(e.to_string()))?;
        info!(addr = %local_addr, "Admin API listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ApiServiceError::Server(e.to_string()))?;

        info!("Admin API stopped");
        Ok(())
    }
}
