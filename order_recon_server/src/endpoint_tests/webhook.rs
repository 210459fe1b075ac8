use actix_web::{http::StatusCode, test::TestRequest};
use order_recon_engine::db_types::Order;
use serde_json::json;

use super::helpers::{send, test_api};
use crate::data_objects::JsonResponse;

#[actix_web::test]
async fn payment_confirmation_creates_an_order() {
    let api = test_api();
    let event = json!({
        "paymentId": "pay_123",
        "amount": 47.49,
        "payerEmail": "jane@example.com",
        "payerName": "Jane Doe"
    });
    let (status, body) = send(&api, TestRequest::post().uri("/webhook/payment_confirmed").set_json(event)).await;
    assert_eq!(status, StatusCode::OK);
    let ack: JsonResponse = serde_json::from_str(&body).unwrap();
    assert!(ack.success);

    let (_, body) = send(&api, TestRequest::get().uri("/api/orders")).await;
    let all: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].payment_id.as_deref(), Some("pay_123"));
}

#[actix_web::test]
async fn unresolvable_notifications_are_still_acknowledged() {
    let api = test_api();
    // No payer email: the fallback candidate fails validation, but the processor must
    // still receive a 200 or it will hammer us with redeliveries.
    let event = json!({ "paymentId": "pay_456", "amount": 10.0 });
    let (status, body) = send(&api, TestRequest::post().uri("/webhook/payment_confirmed").set_json(event)).await;
    assert_eq!(status, StatusCode::OK);
    let ack: JsonResponse = serde_json::from_str(&body).unwrap();
    assert!(!ack.success);

    let (_, body) = send(&api, TestRequest::get().uri("/api/orders")).await;
    let all: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert!(all.is_empty());
}

#[actix_web::test]
async fn redelivered_notifications_do_not_duplicate() {
    let api = test_api();
    let event = json!({
        "paymentId": "pay_789",
        "amount": 15.0,
        "payerEmail": "sam@example.com",
        "payerName": "Sam Smith"
    });
    for _ in 0..3 {
        let (status, _) = send(&api, TestRequest::post().uri("/webhook/payment_confirmed").set_json(&event)).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) = send(&api, TestRequest::get().uri("/api/orders")).await;
    let all: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(all.len(), 1);
}
