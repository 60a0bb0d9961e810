//! # Persistence and Migration
//!
//! Restarts over the file-backed store, and startup migration of documents
//! written under the legacy schema.

use super::harness::{router_for, send};
use admin_runtime::build_api;
use ah_01_lot_sequencing::{FileBackedKVStore, KeyValueStore, KvLotRepository, MigrationReport, SequencingConfig};
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use std::path::Path;

fn open_router(path: &Path) -> axum::Router {
    let store = FileBackedKVStore::open(path).unwrap();
    router_for(build_api(store, &SequencingConfig::default()).unwrap())
}

async fn create(router: &axum::Router, number: &str) -> StatusCode {
    send(
        router,
        Method::POST,
        "/api/admin/lots",
        Some(json!({"auctionId": "spring", "lotNumber": number, "title": "Chair"})),
    )
    .await
    .0
}

async fn listed_numbers(router: &axum::Router) -> Vec<String> {
    let (_, body) = send(router, Method::GET, "/api/admin/lots?auctionId=spring", None).await;
    body["lots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|lot| lot["lotNumber"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_renumbered_index_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lots.kv");

    let router = open_router(&path);
    assert_eq!(create(&router, "1").await, StatusCode::CREATED);
    assert_eq!(create(&router, "2").await, StatusCode::CREATED);
    let (status, _) = send(
        &router,
        Method::POST,
        "/api/admin/lots/renumber",
        Some(json!({"auctionId": "spring", "mappings": [
            {"originalLotNumber": "1", "newLotNumber": "7"}
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    drop(router);

    let router = open_router(&path);
    assert_eq!(listed_numbers(&router).await, vec!["2", "7"]);
    // "1" was released by the renumber, "7" is held.
    assert_eq!(create(&router, "1").await, StatusCode::CREATED);
    assert_eq!(create(&router, "7").await, StatusCode::CONFLICT);
}

fn legacy_document(id: &str, number: &str) -> Value {
    json!({
        "id": id,
        "auctionId": "spring",
        "lotNumber": number,
        "title": "Mantel clock",
        "estimateLow": 400,
        "estimateHigh": 600,
        "estimatedValue": 800,
        "startingPrice": 150,
        "metadata": {"Maker": "Vulliamy"},
        "createdAt": "2019-03-01T09:00:00Z"
    })
}

#[tokio::test]
async fn test_legacy_documents_are_migrated_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lots.kv");

    {
        let mut store = FileBackedKVStore::open(&path).unwrap();
        for (id, number) in [("old-1", "3"), ("old-2", "4")] {
            let key = format!("lot/spring/{id}");
            store
                .put(key.as_bytes(), &serde_json::to_vec(&legacy_document(id, number)).unwrap())
                .unwrap();
        }
    }

    let router = open_router(&path);
    let (status, body) = send(&router, Method::GET, "/api/admin/lots?auctionId=spring", None).await;
    assert_eq!(status, StatusCode::OK);

    let lot = &body["lots"][0];
    assert_eq!(lot["lotNumber"], "3");
    // The current field wins over the legacy one.
    assert_eq!(lot["estimate"]["high"], 600);
    assert_eq!(lot["estimate"]["low"], 400);
    assert_eq!(lot["startingBid"], 150);
    assert!(lot.get("estimatedValue").is_none());
    assert!(lot.get("schemaVersion").is_none());

    // The restored index enforces uniqueness for migrated lots.
    assert_eq!(create(&router, "4").await, StatusCode::CONFLICT);
    drop(router);

    let repository = KvLotRepository::new(FileBackedKVStore::open(&path).unwrap());
    assert_eq!(
        repository.migrate().unwrap(),
        MigrationReport {
            scanned: 2,
            ..Default::default()
        }
    );
}
