//! `GET /demo/concurrent` end to end.

mod common;

use std::time::Duration;

use common::{COLLECTIONS, FlakyStore, app_with, app_with_deadline, call, json};
use http::{Method, StatusCode};
use serde_json::{Value, json};
use userstore::store::MemoryStore;

/// Every collection name found in `results` and `errors`, sorted.
fn reported(body: &Value) -> Vec<String> {
    let mut names: Vec<String> = ["results", "errors"]
        .iter()
        .flat_map(|key| body[*key].as_array().cloned().unwrap_or_default())
        .filter_map(|entry| entry["collection"].as_str().map(str::to_owned))
        .collect();
    names.sort();
    names
}

fn seeded() -> MemoryStore {
    MemoryStore::new()
        .with_collection("users", 4)
        .with_collection("orders", 11)
}

#[tokio::test]
async fn all_counts_succeed_with_ok() {
    let res = call(&app_with(seeded()), Method::GET, "/demo/concurrent", "").await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let body = json(&res);
    assert_eq!(body["errors"], json!([]));
    assert_eq!(reported(&body), ["orders", "products", "users"]);
    assert!(body["results"].as_array().unwrap().contains(&json!({ "collection": "orders", "count": 11 })));
}

#[tokio::test]
async fn failing_orders_yields_partial_content() {
    let store = FlakyStore::new(seeded()).fail_count("orders");
    let res = call(&app_with(store), Method::GET, "/demo/concurrent", "").await;
    assert_eq!(res.status_code(), StatusCode::PARTIAL_CONTENT);

    let body = json(&res);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.contains(&json!({ "collection": "products", "count": 0 })));
    assert!(results.contains(&json!({ "collection": "users", "count": 4 })));

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["collection"], "orders");
    assert!(errors[0]["error"].as_str().unwrap().contains("orders shard offline"));
}

#[tokio::test]
async fn every_collection_failing_still_answers() {
    let store = COLLECTIONS
        .iter()
        .fold(FlakyStore::new(seeded()), |s, c| s.fail_count(c));
    let res = call(&app_with(store), Method::GET, "/demo/concurrent", "").await;
    assert_eq!(res.status_code(), StatusCode::PARTIAL_CONTENT);

    let body = json(&res);
    assert_eq!(body["results"], json!([]));
    assert_eq!(reported(&body), ["orders", "products", "users"]);
}

#[tokio::test]
async fn hanging_counts_are_cut_off_at_the_deadline() {
    let deadline = Duration::from_millis(200);
    let store = FlakyStore::new(seeded()).hang_count("users").hang_count("products");
    let app = app_with_deadline(store, deadline);

    let started = std::time::Instant::now();
    let res = call(&app, Method::GET, "/demo/concurrent", "").await;
    assert!(started.elapsed() < deadline + Duration::from_secs(2));

    assert_eq!(res.status_code(), StatusCode::PARTIAL_CONTENT);
    let body = json(&res);
    assert_eq!(body["results"], json!([{ "collection": "orders", "count": 11 }]));
    assert_eq!(reported(&body), ["orders", "products", "users"]);
}
