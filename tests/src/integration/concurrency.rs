//! # Racing Mutations
//!
//! Many requests against one auction at once. Every request must either
//! commit or answer 409, and the uniqueness invariants must hold afterwards.

use super::harness::TestApp;
use axum::http::StatusCode;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_renumbers_onto_one_number() {
    let app = Arc::new(TestApp::new());
    let numbers: Vec<String> = (1..=16).map(|n| n.to_string()).collect();
    for number in &numbers {
        app.create_lot("spring", number).await;
    }

    let tasks = numbers.iter().cloned().map(|number| {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.renumber("spring", &[(number.as_str(), "100")]).await })
    });
    let results: Vec<(StatusCode, serde_json::Value)> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let committed = results.iter().filter(|(s, _)| *s == StatusCode::OK).count();
    let conflicted = results.iter().filter(|(s, _)| *s == StatusCode::CONFLICT).count();
    assert_eq!(committed, 1);
    assert_eq!(committed + conflicted, results.len());

    let stored: Vec<String> = app.numbers("spring").await.into_values().collect();
    assert_eq!(stored.iter().filter(|n| *n == "100").count(), 1);
    let unique: HashSet<&String> = stored.iter().collect();
    assert_eq!(unique.len(), stored.len());
    assert_eq!(app.audit("spring").await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_reorders_leave_a_valid_permutation() {
    let app = Arc::new(TestApp::new());
    let mut ids = Vec::new();
    for number in 1..=8 {
        ids.push(app.create_lot("spring", &number.to_string()).await);
    }

    let tasks = (0..8).map(|shift| {
        let app = Arc::clone(&app);
        let mut order = ids.clone();
        order.rotate_left(shift);
        tokio::spawn(async move { app.reorder("spring", &order).await.0 })
    });
    let statuses: Vec<StatusCode> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert!(statuses
        .iter()
        .all(|s| *s == StatusCode::OK || *s == StatusCode::CONFLICT));
    let committed = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    assert!(committed >= 1);

    let mut sequences: Vec<u64> = app
        .sequences("spring")
        .await
        .into_values()
        .map(|s| s.expect("every lot sequenced"))
        .collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (1..=8).collect::<Vec<u64>>());
    assert_eq!(app.audit("spring").await.len(), committed);
}
