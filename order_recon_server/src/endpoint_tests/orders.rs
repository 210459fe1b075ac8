use actix_web::{http::StatusCode, test::TestRequest};
use order_recon_engine::db_types::Order;
use serde_json::json;

use super::helpers::{sample_order, send, test_api};

#[actix_web::test]
async fn create_then_retry_uses_the_status_code_to_tell_them_apart() {
    let api = test_api();
    let (status, body) = send(&api, TestRequest::post().uri("/api/orders").set_json(sample_order("WEB-1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let original: Order = serde_json::from_str(&body).expect("valid order JSON");

    // A retry with the same idempotency token comes back 200 with the original record.
    let (status, body) = send(&api, TestRequest::post().uri("/api/orders").set_json(sample_order("WEB-2"))).await;
    assert_eq!(status, StatusCode::OK);
    let reused: Order = serde_json::from_str(&body).expect("valid order JSON");
    assert_eq!(reused.id, original.id);
}

#[actix_web::test]
async fn invalid_candidates_are_bad_requests() {
    let api = test_api();
    let mut candidate = sample_order("WEB-1");
    candidate.items.clear();
    let (status, body) = send(&api, TestRequest::post().uri("/api/orders").set_json(candidate)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid order"));
}

#[actix_web::test]
async fn list_and_fetch_by_id() {
    let api = test_api();
    let (_, body) = send(&api, TestRequest::post().uri("/api/orders").set_json(sample_order("WEB-1"))).await;
    let order: Order = serde_json::from_str(&body).unwrap();

    let (status, body) = send(&api, TestRequest::get().uri("/api/orders")).await;
    assert_eq!(status, StatusCode::OK);
    let all: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(all.len(), 1);

    let (status, body) = send(&api, TestRequest::get().uri(&format!("/api/orders/{}", order.id))).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched.id, order.id);

    let (status, _) = send(&api, TestRequest::get().uri("/api/orders/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn stats_and_audit_are_not_swallowed_by_the_id_matcher() {
    let api = test_api();
    send(&api, TestRequest::post().uri("/api/orders").set_json(sample_order("WEB-1"))).await;

    let (status, body) = send(&api, TestRequest::get().uri("/api/orders/stats")).await;
    assert_eq!(status, StatusCode::OK);
    let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["totalOrders"], 1);

    let (status, body) = send(&api, TestRequest::get().uri("/api/orders/audit")).await;
    assert_eq!(status, StatusCode::OK);
    let findings: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(findings.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn status_transitions_over_http() {
    let api = test_api();
    let (_, body) = send(&api, TestRequest::post().uri("/api/orders").set_json(sample_order("WEB-1"))).await;
    let order: Order = serde_json::from_str(&body).unwrap();
    let uri = format!("/api/orders/{}/status", order.id);

    let (status, body) = send(&api, TestRequest::patch().uri(&uri).set_json(json!({"status": "processing"}))).await;
    assert_eq!(status, StatusCode::OK);
    let updated: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(updated.status.to_string(), "processing");

    // Skipping a stage is a client error, not a server one.
    let (status, body) = send(&api, TestRequest::patch().uri(&uri).set_json(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("cannot move"));
}

#[actix_web::test]
async fn delete_and_restore_round_trip() {
    let api = test_api();
    let (_, body) = send(&api, TestRequest::post().uri("/api/orders").set_json(sample_order("WEB-1"))).await;
    let order: Order = serde_json::from_str(&body).unwrap();

    let (status, _) = send(&api, TestRequest::delete().uri(&format!("/api/orders/{}", order.id))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&api, TestRequest::get().uri(&format!("/api/orders/{}", order.id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&api, TestRequest::post().uri(&format!("/api/orders/{}/restore", order.id))).await;
    assert_eq!(status, StatusCode::OK);
    let restored: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(restored.order_number, order.order_number);

    // The undo entry was consumed, so a second restore finds nothing.
    let (status, _) = send(&api, TestRequest::post().uri(&format!("/api/orders/{}/restore", order.id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
