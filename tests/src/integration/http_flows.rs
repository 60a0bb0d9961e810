//! # Admin HTTP Flows
//!
//! Reorder and renumber driven through the full router, checking both the
//! HTTP answer and the stored state behind it.

use super::harness::{send, TestApp};
use ah_01_lot_sequencing::{BatchOperation, InMemoryKVStore, KVStoreError, KeyValueStore, ScanResult};
use axum::http::{Method, StatusCode};
use proptest::prelude::*;
use serde_json::json;
use shared_types::AuditAction;

async fn three_lots(app: &TestApp) -> Vec<String> {
    let mut ids = Vec::new();
    for number in ["1", "2", "3"] {
        ids.push(app.create_lot("spring", number).await);
    }
    ids
}

// =============================================================================
// REORDER
// =============================================================================

#[tokio::test]
async fn test_reorder_assigns_contiguous_positions() {
    let app = TestApp::new();
    let ids = three_lots(&app).await;
    let order = vec![ids[2].clone(), ids[0].clone(), ids[1].clone()];

    let (status, body) = app.reorder("spring", &order).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "updated": 3}));

    let sequences = app.sequences("spring").await;
    for (index, id) in order.iter().enumerate() {
        assert_eq!(sequences[id], Some(index as u64 + 1));
    }
}

#[tokio::test]
async fn test_reorder_with_foreign_lot_changes_nothing() {
    let app = TestApp::new();
    let ids = three_lots(&app).await;
    let foreign = app.create_lot("autumn", "1").await;

    let (status, body) = app
        .reorder("spring", &[ids[1].clone(), foreign.clone(), ids[0].clone()])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains(&foreign));

    assert!(app.sequences("spring").await.values().all(Option::is_none));
    assert!(app.sequences("autumn").await.values().all(Option::is_none));
    assert!(app.audit("spring").await.is_empty());
}

#[tokio::test]
async fn test_reorder_resubmission_is_idempotent_and_audited_twice() {
    let app = TestApp::new();
    let ids = three_lots(&app).await;
    let order = vec![ids[1].clone(), ids[2].clone(), ids[0].clone()];

    assert_eq!(app.reorder("spring", &order).await.0, StatusCode::OK);
    let first = app.sequences("spring").await;

    assert_eq!(app.reorder("spring", &order).await.0, StatusCode::OK);
    assert_eq!(app.sequences("spring").await, first);

    let audit = app.audit("spring").await;
    assert_eq!(audit.len(), 2);
    assert!(audit.iter().all(|e| e.action == AuditAction::LotReorder));
    assert!(audit.iter().all(|e| e.entity_type == "Auction"));
}

#[tokio::test]
async fn test_reorder_records_acting_user() {
    let app = TestApp::new();
    let ids = three_lots(&app).await;

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/admin/lots/reorder",
            Some(json!({
                "auctionId": "spring",
                "updates": [{"lotId": ids[0], "sequence": 10}],
                "userId": "curator-3"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let audit = app.audit("spring").await;
    assert_eq!(audit[0].actor_id.as_deref(), Some("curator-3"));
    assert_eq!(audit[0].changes["updates"][0]["sequence"], 10);

    let lots = app.lots("spring").await;
    assert_eq!(lots[0]["lastSequencedById"], "curator-3");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_http_reorder_yields_identity_positions(
        order in (1usize..12).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let app = TestApp::new();
            let mut ids = Vec::new();
            for number in 0..order.len() {
                ids.push(app.create_lot("spring", &(number + 1).to_string()).await);
            }
            let submitted: Vec<String> = order.iter().map(|i| ids[*i].clone()).collect();

            let (status, _) = app.reorder("spring", &submitted).await;
            assert_eq!(status, StatusCode::OK);

            let sequences = app.sequences("spring").await;
            for (index, id) in submitted.iter().enumerate() {
                assert_eq!(sequences[id], Some(index as u64 + 1));
            }
        });
    }
}

// =============================================================================
// RENUMBER
// =============================================================================

#[tokio::test]
async fn test_renumber_swap() {
    let app = TestApp::new();
    let ids = three_lots(&app).await;

    let (status, body) = app.renumber("spring", &[("1", "2"), ("2", "1")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 2);

    let numbers = app.numbers("spring").await;
    assert_eq!(numbers[&ids[0]], "2");
    assert_eq!(numbers[&ids[1]], "1");
    assert_eq!(numbers[&ids[2]], "3");

    let audit = app.audit("spring").await;
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, AuditAction::LotRenumber);
    assert_eq!(audit[0].changes["mappings"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_renumber_duplicate_targets_rejected_before_lookup() {
    // The auction is empty: a lookup would report the originals as missing.
    let app = TestApp::new();

    let (status, body) = app.renumber("spring", &[("1", "9"), ("2", "9")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Duplicate newLotNumber"));
}

#[tokio::test]
async fn test_renumber_missing_original_is_404() {
    let app = TestApp::new();
    three_lots(&app).await;

    let (status, body) = app.renumber("spring", &[("1", "10"), ("7", "11")]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "error": "Lot numbers not found in auction spring: 7"})
    );
    assert_eq!(app.numbers("spring").await.values().filter(|n| *n == "1").count(), 1);
}

#[tokio::test]
async fn test_renumber_onto_held_number_is_409() {
    let app = TestApp::new();
    three_lots(&app).await;
    app.create_lot("spring", "5").await;

    let (status, body) = app.renumber("spring", &[("1", "5")]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "Lot numbers already in use in auction spring: 5"
    );
    assert!(app.audit("spring").await.is_empty());
}

#[tokio::test]
async fn test_renumber_leaves_sequences_alone() {
    let app = TestApp::new();
    let ids = three_lots(&app).await;
    app.reorder("spring", &ids).await;
    let before = app.sequences("spring").await;

    let (status, _) = app.renumber("spring", &[("1", "1A")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.sequences("spring").await, before);
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Reads succeed, every write fails with a detailed I/O error.
struct ReadOnlyDisk(InMemoryKVStore);

fn disk_error() -> KVStoreError {
    KVStoreError::IOError {
        message: "write to /srv/admin/lots.kv failed: disk quota exceeded".into(),
    }
}

impl KeyValueStore for ReadOnlyDisk {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.0.get(key)
    }

    fn put(&mut self, _key: &[u8], _value: &[u8]) -> Result<(), KVStoreError> {
        Err(disk_error())
    }

    fn delete(&mut self, _key: &[u8]) -> Result<(), KVStoreError> {
        Err(disk_error())
    }

    fn atomic_batch_write(&mut self, _operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        Err(disk_error())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.0.exists(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        self.0.prefix_scan(prefix)
    }
}

#[tokio::test]
async fn test_storage_failures_are_not_leaked() {
    let app = TestApp::with_store(ReadOnlyDisk(InMemoryKVStore::new()));

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/lots",
            Some(json!({"auctionId": "spring", "lotNumber": "1", "title": "Clock"})),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": "internal error"}));
    assert!(!body.to_string().contains("quota"));
}

#[tokio::test]
async fn test_malformed_bodies_are_400() {
    let app = TestApp::new();

    for body in [
        json!({"auctionId": "spring", "mappings": "1->2"}),
        json!({"auctionId": 7, "mappings": []}),
        json!([1, 2, 3]),
    ] {
        let (status, answer) = send(&app.router, Method::POST, "/api/admin/lots/renumber", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(answer["success"], false);
    }

    let (status, _) = app.renumber("spring", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
