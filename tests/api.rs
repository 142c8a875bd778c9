//! HTTP-level tests for the produce API.
//!
//! Each test builds a fresh router over the "testing" seed profile and drives
//! it in-process with `oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use produce_service::config::SeedProfile;
use produce_service::{build_router, seed, AppState};

fn create_test_app() -> axum::Router {
    let state = AppState::new(seed::initial_items(SeedProfile::Testing));
    build_router(state, "/api")
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Body>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder.body(body.unwrap_or_else(Body::empty)).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

async fn send_json(app: &axum::Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, method, uri, Some(Body::from(body.to_string()))).await
}

// ── List / Get ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_returns_seed_in_order() {
    let app = create_test_app();
    let (status, body) = send(&app, "GET", "/api/produce", None).await;

    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["produce_code"].as_str().unwrap())
        .collect();
    assert_eq!(
        codes,
        vec![
            "A12T-4GH7-QPL9-3N4M",
            "E5T6-9UI3-TH15-QR88",
            "YRT6-72AS-K736-L4AR",
            "2222-2222-2222-2222"
        ]
    );
}

#[tokio::test]
async fn test_get_lowercase_code_returns_uppercased_item() {
    let app = create_test_app();
    let (status, body) = send(&app, "GET", "/api/produce/a12t-4gh7-qpl9-3n4m", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "produce_code": "A12T-4GH7-QPL9-3N4M", "name": "Lettuce", "unit_price": "$3.46" })
    );
}

#[tokio::test]
async fn test_get_bad_format_and_missing() {
    let app = create_test_app();

    let (status, _) = send(&app, "GET", "/api/produce/aji-ewfi-23ijf", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/produce/1111-1111-1111-1111", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("1111-1111-1111-1111"));
}

// ── Create ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_roundtrip_uppercases_code() {
    let app = create_test_app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/produce",
        json!({ "produce_code": "abcd-1111-1111-1111", "name": "Bacon", "unit_price": "$1.23" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["produce_code"], "ABCD-1111-1111-1111");

    let (status, body) = send(&app, "GET", "/api/produce/ABCD-1111-1111-1111", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Bacon");
    assert_eq!(body["unit_price"], "$1.23");
}

#[tokio::test]
async fn test_create_duplicate_is_conflict() {
    let app = create_test_app();
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/produce",
        json!({ "produce_code": "a12t-4gh7-qpl9-3n4m", "name": "Lettuce", "unit_price": "$3.46" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_malformed_json_is_bad_request() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/produce",
        Some(Body::from(r#"{"produce_code": "AAAA-"#)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid JSON"));
}

#[tokio::test]
async fn test_create_invalid_fields_lists_errors_per_field() {
    let app = create_test_app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/produce",
        json!({ "produce_code": "12fava-sdfw-eaav-va", "name": "fj#@j" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errs = &body["validation_errors"];
    assert_eq!(errs["produce_code"], json!(["invalid produce code format"]));
    assert_eq!(errs["name"], json!(["invalid name format"]));
    assert_eq!(
        errs["unit_price"],
        json!(["unit price field is required", "invalid unit price format"])
    );
}

// ── Update ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_via_put_and_post() {
    let app = create_test_app();

    let (status, body) = send_json(
        &app,
        "PUT",
        "/api/produce/e5t6-9ui3-th15-qr88",
        json!({ "produce_code": "E5T6-9UI3-TH15-QR88", "name": "White Peach", "unit_price": "$3.10" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "White Peach");

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/produce/E5T6-9UI3-TH15-QR88",
        json!({ "produce_code": "E5T6-9UI3-TH15-QR88", "name": "Flat Peach", "unit_price": "$3.20" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Flat Peach");
}

#[tokio::test]
async fn test_update_rename_moves_item() {
    let app = create_test_app();
    let (status, body) = send_json(
        &app,
        "PUT",
        "/api/produce/2222-2222-2222-2222",
        json!({ "produce_code": "1111-1111-1111-1111", "name": "Bacon", "unit_price": "$1.23" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["produce_code"], "1111-1111-1111-1111");

    let (status, _) = send(&app, "GET", "/api/produce/2222-2222-2222-2222", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/api/produce/1111-1111-1111-1111", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_failures() {
    let app = create_test_app();
    let bacon = |code: &str| json!({ "produce_code": code, "name": "Bacon", "unit_price": "$1.23" });

    let (status, _) = send_json(&app, "PUT", "/api/produce/2222-2222", bacon("1111-1111-1111-1111")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "bad path code");

    let (status, _) =
        send_json(&app, "PUT", "/api/produce/ABCD-2222-2222-2222", bacon("ABCD-2222-2222-2222")).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "missing code");

    let (status, _) =
        send_json(&app, "PUT", "/api/produce/2222-2222-2222-2222", bacon("A12T-4GH7-QPL9-3N4M")).await;
    assert_eq!(status, StatusCode::CONFLICT, "rename onto existing code");

    let (status, body) = send_json(
        &app,
        "PUT",
        "/api/produce/2222-2222-2222-2222",
        json!({ "produce_code": "2222-2222-2222-2222", "name": " Bacon", "unit_price": "$01.50" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "invalid fields");
    assert!(body["validation_errors"]["name"].is_array());
    assert!(body["validation_errors"]["unit_price"].is_array());
}

// ── Delete ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_lettuce_scenario() {
    let app = create_test_app();
    let code = "A12T-4GH7-QPL9-3N4M";

    let (status, body) = send(&app, "GET", "/api/produce/a12t-4gh7-qpl9-3n4m", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["produce_code"], code);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/produce",
        json!({ "produce_code": code, "name": "Lettuce", "unit_price": "$3.46" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "DELETE", &format!("/api/produce/{}", code), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Lettuce");

    let (status, _) = send(&app, "DELETE", &format!("/api/produce/{}", code), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/produce/not-a-code", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Supplemental endpoints ────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_is_not_prefixed() {
    let app = create_test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_seed_grows_store() {
    let app = create_test_app();
    let (status, body) = send(&app, "POST", "/api/seed?count=25", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let created = body["created"].as_u64().unwrap();
    let skipped = body["skipped_conflicts"].as_u64().unwrap();
    assert_eq!(created + skipped, 25);
    assert_eq!(body["total_items"].as_u64().unwrap(), 4 + created);
}

#[tokio::test]
async fn test_stress_test_reports_all_ops() {
    let app = create_test_app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/stress-test",
        json!({ "concurrency": 4, "ops_per_user": 10 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_ops"], 40);
    let accounted: u64 = ["reads", "creates", "updates", "deletes", "not_found", "conflicts"]
        .iter()
        .map(|k| body[*k].as_u64().unwrap())
        .sum();
    assert_eq!(accounted, 40);
}

#[tokio::test]
async fn test_metrics_track_store_calls() {
    let app = create_test_app();
    send(&app, "GET", "/api/produce/A12T-4GH7-QPL9-3N4M", None).await;
    send(&app, "GET", "/api/produce/1111-1111-1111-1111", None).await;

    let (status, body) = send(&app, "GET", "/api/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entry_count"], 2);
    let outcomes: Vec<&str> = body["aggregated"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["outcome"].as_str().unwrap())
        .collect();
    assert_eq!(outcomes, vec!["not_found", "ok"]);

    let (status, body) = send(&app, "DELETE", "/api/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared"], 2);
}

#[tokio::test]
async fn test_metrics_csv_export() {
    let app = create_test_app();
    send(&app, "GET", "/api/produce", None).await;

    let request = Request::builder()
        .uri("/api/metrics/export/csv")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/csv");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().nth(1).unwrap().contains(",list,ok,"));
}

#[tokio::test]
async fn test_root_prefix_mounts_api_at_root() {
    let app = build_router(AppState::new(seed::initial_items(SeedProfile::Default)), "");
    let (status, body) = send(&app, "GET", "/produce/tq4c-vv6t-75zx-1rmr", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Gala Apple");
}

#[tokio::test]
async fn test_stress_test_rejects_bad_params_without_touching_store() {
    let app = create_test_app();
    let (_, before) = send(&app, "GET", "/api/produce", None).await;

    let (status, body) = send_json(&app, "POST", "/api/stress-test", json!({ "concurrency": "lots" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid JSON"));

    let (status, _) = send(&app, "POST", "/api/stress-test", Some(Body::from("{not json"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, after) = send(&app, "GET", "/api/produce", None).await;
    assert_eq!(before, after, "a rejected stress run must not mutate the catalog");
}

#[tokio::test]
async fn test_stress_test_without_body_uses_defaults() {
    let app = create_test_app();
    let (status, body) = send(&app, "POST", "/api/stress-test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["concurrency"], 20);
    assert_eq!(body["ops_per_user"], 50);
}

#[tokio::test]
async fn test_seed_bad_count_is_json_error() {
    let app = create_test_app();
    let (status, body) = send(&app, "POST", "/api/seed?count=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid query"));

    let (_, list) = send(&app, "GET", "/api/produce", None).await;
    assert_eq!(list.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_create_null_fields_report_required() {
    let app = create_test_app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/produce",
        json!({ "produce_code": null, "name": "Bacon", "unit_price": null }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errs = &body["validation_errors"];
    assert_eq!(
        errs["produce_code"],
        json!(["produce code field is required", "invalid produce code format"])
    );
    assert_eq!(
        errs["unit_price"],
        json!(["unit price field is required", "invalid unit price format"])
    );
    assert!(errs.get("name").is_none());
}
