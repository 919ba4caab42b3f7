//! Supplies sync against a throwaway local feed.

use std::time::Duration;

use axum::{http::StatusCode, routing::get, Json, Router};
use newworld_api::services::{SuppliesSync, SyncError};
use newworld_core::{Money, NewOffer};
use newworld_db::{Database, DbConfig};
use serde_json::{json, Value};

/// Serves `router` on an ephemeral port and returns its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn feed(body: Value) -> String {
    let router = Router::new().route("/supplies", get(move || async move { Json(body) }));
    format!("{}/supplies", serve(router).await)
}

async fn quantity_of(db: &Database, name: &str) -> i64 {
    db.offers()
        .list()
        .await
        .unwrap()
        .into_iter()
        .find(|offer| offer.name == name)
        .map(|offer| offer.quantity)
        .unwrap()
}

#[tokio::test]
async fn test_sync_writes_the_catalog() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let url = feed(json!({
        "food": { "fruits": 50, "meat": 12, "water": 7 },
        "medicine": { "antibiotics": 25 }
    }))
    .await;

    let (job, _handle) = SuppliesSync::new(db.clone(), url, Duration::from_secs(3600)).unwrap();
    let written = job.sync_once().await.unwrap();

    assert_eq!(written, 7);
    assert_eq!(db.offers().count().await.unwrap(), 7);
    assert_eq!(quantity_of(&db, "fruits").await, 10);
    assert_eq!(quantity_of(&db, "meat").await, 2);
    assert_eq!(quantity_of(&db, "water").await, 1);
    assert_eq!(quantity_of(&db, "vegetables").await, 0);
    assert_eq!(quantity_of(&db, "antibiotics").await, 5);
}

#[tokio::test]
async fn test_sync_overwrites_existing_offers_by_name() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let before = db
        .offers()
        .create(&NewOffer::new("meat", 99, Money::from_cents(400), "food"))
        .await
        .unwrap();
    let url = feed(json!({ "food": { "meat": 20 }, "medicine": {} })).await;

    let (job, _handle) = SuppliesSync::new(db.clone(), url, Duration::from_secs(3600)).unwrap();
    job.sync_once().await.unwrap();

    let after = db.offers().get_by_id(before.id).await.unwrap().unwrap();
    assert_eq!(after.quantity, 4);
    assert_eq!(db.offers().count().await.unwrap(), 7);
}

#[tokio::test]
async fn test_failed_feed_leaves_catalog_alone() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.offers()
        .create(&NewOffer::new("water", 3, Money::from_cents(100), "drink"))
        .await
        .unwrap();

    let router = Router::new().route(
        "/supplies",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
    );
    let url = format!("{}/supplies", serve(router).await);

    let (job, _handle) = SuppliesSync::new(db.clone(), url, Duration::from_secs(3600)).unwrap();
    let err = job.sync_once().await.unwrap_err();

    assert!(matches!(err, SyncError::Status(s) if s.as_u16() == 503));
    assert_eq!(db.offers().count().await.unwrap(), 1);
    assert_eq!(quantity_of(&db, "water").await, 3);
}

#[tokio::test]
async fn test_malformed_feed_is_skipped() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let url = feed(json!({ "food": "not a map" })).await;

    let (job, _handle) = SuppliesSync::new(db.clone(), url, Duration::from_secs(3600)).unwrap();
    let err = job.sync_once().await.unwrap_err();

    assert!(matches!(err, SyncError::Fetch(_)));
    assert_eq!(db.offers().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_run_syncs_on_start_and_stops_on_shutdown() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let url = feed(json!({ "food": { "fruits": 5 }, "medicine": {} })).await;

    let (job, handle) = SuppliesSync::new(db.clone(), url, Duration::from_secs(3600)).unwrap();
    let task = tokio::spawn(job.run());

    let mut synced = false;
    for _ in 0..50 {
        if db.offers().count().await.unwrap() == 7 {
            synced = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(synced, "first tick should sync immediately");

    handle.shutdown().await;
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("sync loop did not stop")
        .unwrap();
}
