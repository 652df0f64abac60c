//! Integration tests for the Skutier HTTP API.

#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;
use skutier::api::create_router;
use skutier_core::Engine;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn create_server() -> TestServer {
    TestServer::new(create_router(Engine::default())).unwrap()
}

const BATCH: &str = "\
variant_id,group_category,lifetime_lots_sold,lifetime_active_days,last3_months_lots_sold,last3_months_active_days,last3_months_net_delivered_buyers,lifetime_net_delivered_buyers
V-1,Dairy,900,300,180,90,120,400
V-2,Dairy,300,300,45,90,40,150
V-3,Snacks,60,200,9,60,8,30
";

// =============================================================================
// TESTS
// =============================================================================

#[tokio::test]
async fn test_health() {
    let server = create_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_definitions() {
    let server = create_server();
    let response = server.get("/definitions").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["components"][0]["weight"], 0.3);
    assert_eq!(body["tiers"][6]["tier"], "STANDARD");
    assert!(body["composite_formula"].as_str().unwrap().contains("0.25 × Conversion"));
}

#[tokio::test]
async fn test_score_returns_rows_and_diagnostics() {
    let server = create_server();
    let response = server.post("/score").text(BATCH).await;
    response.assert_status_ok();

    let body: Value = response.json();
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2]["variant_id"], "V-3");
    assert_eq!(rows[0]["final_classification"], "PLATINUM_ABSOLUTE");
    assert!(body["diagnostics"].is_array());
}

#[tokio::test]
async fn test_score_missing_columns_is_422() {
    let server = create_server();
    let response = server
        .post("/score")
        .text("variant_id,lifetime_lots_sold\nV-1,4\n")
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["details"]["kind"], "missing_columns");
    assert_eq!(body["details"]["details"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_score_duplicate_ids_is_422() {
    let server = create_server();
    let body = format!("{BATCH}V-1,Dairy,1,1,1,1,1,1\n");
    let response = server.post("/score").text(body).expect_failure().await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["details"]["kind"], "duplicate_variant_ids");
    assert_eq!(body["details"]["details"][0]["rows"], serde_json::json!([0, 3]));
}

#[tokio::test]
async fn test_rescoring_scored_output_is_422() {
    let server = create_server();
    let scored = server.post("/score").text(BATCH).await;
    let columns: Vec<String> = scored.json::<Value>()["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap().to_string())
        .collect();
    let body = format!("{}\n", columns.join(","));

    let response = server.post("/score").text(body).expect_failure().await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["details"]["kind"], "reserved_columns");
    assert_eq!(body["details"]["details"][0], "velocity_score");
}

#[tokio::test]
async fn test_score_malformed_csv_is_400() {
    let server = create_server();
    let response = server
        .post("/score")
        .bytes(b"variant_id\n\xff\xfe\n".as_slice().into())
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert!(body["error"].is_string());
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_summary() {
    let server = create_server();
    let response = server.post("/summary").text(BATCH).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["total_skus"], 3);
    assert_eq!(body["categories"], 2);
    assert_eq!(body["category_top_bands"]["ranked"], 3);
}
