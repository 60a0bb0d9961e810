//! Test fixture: a fully layered admin router over a real repository.
//!
//! The repository handle stays available so tests can inspect the audit log
//! and stored state behind the HTTP surface.

use ah_01_lot_sequencing::{
    AuditLog, InMemoryKVStore, KeyValueStore, KvLotRepository, LotSequencingApi,
    LotSequencingDependencies, LotSequencingService, SequencingConfig, SystemClock,
};
use ah_02_admin_api::{create_router, AdminApiConfig, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use shared_types::{AuctionId, AuditEntry};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;

/// Router with the default admin API configuration around `api`.
pub fn router_for(api: Arc<dyn LotSequencingApi>) -> Router {
    create_router(AppState::new(api), &AdminApiConfig::default())
}

/// Send one request and decode the JSON answer (`Null` for an empty body).
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |v| Body::from(v.to_string())))
        .expect("request builds");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");

    if bytes.is_empty() {
        return (status, Value::Null);
    }
    (status, serde_json::from_slice(&bytes).expect("body is JSON"))
}

/// Admin router plus the repository behind it.
pub struct TestApp<S: KeyValueStore + 'static = InMemoryKVStore> {
    pub router: Router,
    pub repository: KvLotRepository<S>,
}

impl TestApp<InMemoryKVStore> {
    pub fn new() -> Self {
        Self::with_store(InMemoryKVStore::new())
    }
}

impl Default for TestApp<InMemoryKVStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: KeyValueStore + 'static> TestApp<S> {
    pub fn with_store(store: S) -> Self {
        let repository = KvLotRepository::new(store);
        let service = LotSequencingService::new(
            LotSequencingDependencies {
                repository: repository.clone(),
                audit: repository.clone(),
                clock: SystemClock,
            },
            SequencingConfig::default(),
        );
        Self {
            router: router_for(Arc::new(service)),
            repository,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.router, method, uri, body).await
    }

    /// Register a lot and return its id.
    pub async fn create_lot(&self, auction_id: &str, lot_number: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/admin/lots",
                Some(json!({
                    "auctionId": auction_id,
                    "lotNumber": lot_number,
                    "title": format!("Lot {lot_number}"),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body["lot"]["id"].as_str().expect("lot id").to_string()
    }

    pub async fn reorder(&self, auction_id: &str, order: &[String]) -> (StatusCode, Value) {
        self.send(
            Method::PUT,
            "/api/admin/lots/reorder",
            Some(json!({ "auctionId": auction_id, "order": order })),
        )
        .await
    }

    pub async fn renumber(&self, auction_id: &str, mappings: &[(&str, &str)]) -> (StatusCode, Value) {
        let mappings: Vec<Value> = mappings
            .iter()
            .map(|(from, to)| json!({ "originalLotNumber": from, "newLotNumber": to }))
            .collect();
        self.send(
            Method::POST,
            "/api/admin/lots/renumber",
            Some(json!({ "auctionId": auction_id, "mappings": mappings })),
        )
        .await
    }

    /// Listed lots of the auction, in display order.
    pub async fn lots(&self, auction_id: &str) -> Vec<Value> {
        let (status, body) = self
            .send(Method::GET, &format!("/api/admin/lots?auctionId={auction_id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK, "list failed: {body}");
        body["lots"].as_array().cloned().unwrap_or_default()
    }

    /// Lot id → sequence (`None` when unsequenced).
    pub async fn sequences(&self, auction_id: &str) -> BTreeMap<String, Option<u64>> {
        self.lots(auction_id)
            .await
            .iter()
            .map(|lot| (lot["id"].as_str().unwrap_or_default().to_string(), lot["sequence"].as_u64()))
            .collect()
    }

    /// Lot id → lot number.
    pub async fn numbers(&self, auction_id: &str) -> BTreeMap<String, String> {
        self.lots(auction_id)
            .await
            .iter()
            .map(|lot| {
                (
                    lot["id"].as_str().unwrap_or_default().to_string(),
                    lot["lotNumber"].as_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    pub async fn audit(&self, auction_id: &str) -> Vec<AuditEntry> {
        let auction = AuctionId::parse(auction_id).expect("valid auction id");
        self.repository
            .entries_for(&auction)
            .await
            .expect("audit log readable")
    }
}
