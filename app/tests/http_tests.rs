// app/tests/http_tests.rs
mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::*;
use serde_json::{json, Value};
use storefront::models::ShippingMethod;
use storefront::web::configure_app_routes;
use uuid::Uuid;

macro_rules! init_app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state))
        .configure(configure_app_routes),
    )
    .await
  };
}

#[actix_rt::test]
async fn health_check_responds_ok() {
  let app = spawn_app().await;
  let service = init_app!(app.state.clone());

  let req = test::TestRequest::get().uri("/api/v1/health").to_request();
  let body: Value = test::call_and_read_body_json(&service, req).await;
  assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_rt::test]
async fn post_order_returns_created_details() {
  let app = spawn_app().await;
  let (a, b) = seed_catalog(&app.store).await;
  let service = init_app!(app.state.clone());

  let payload = order_request(app.customer_id, &[(a.id, 2), (b.id, 2)], ShippingMethod::HomeDelivery);
  let req = test::TestRequest::post().uri("/api/v1/orders").set_json(&payload).to_request();
  let resp = test::call_service(&service, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["final_amount_cents"], 3200);
  assert_eq!(body["status"], "processing");
  assert_eq!(body["payment_status"], "paid");
  assert_eq!(body["shipping_method"], "home_delivery");
  assert_eq!(body["items"].as_array().map(Vec::len), Some(2));
  assert_eq!(body["delivery_address"]["postal_code"], "97403");

  let order_id = body["id"].as_str().unwrap().to_string();
  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/orders/{}", order_id))
    .to_request();
  let resp = test::call_service(&service, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn empty_items_are_bad_request() {
  let app = spawn_app().await;
  let service = init_app!(app.state.clone());

  let payload = order_request(app.customer_id, &[], ShippingMethod::HomeDelivery);
  let req = test::TestRequest::post().uri("/api/v1/orders").set_json(&payload).to_request();
  let resp = test::call_service(&service, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "validation");
}

#[actix_rt::test]
async fn malformed_json_is_bad_request() {
  let app = spawn_app().await;
  let service = init_app!(app.state.clone());

  let req = test::TestRequest::post()
    .uri("/api/v1/orders")
    .insert_header(("content-type", "application/json"))
    .set_payload("{\"customer_id\": ")
    .to_request();
  let resp = test::call_service(&service, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "validation");
}

#[actix_rt::test]
async fn insufficient_stock_is_conflict() {
  let app = spawn_app().await;
  let (_, b) = seed_catalog(&app.store).await;
  let service = init_app!(app.state.clone());

  let payload = order_request(app.customer_id, &[(b.id, 3)], ShippingMethod::HomeDelivery);
  let req = test::TestRequest::post().uri("/api/v1/orders").set_json(&payload).to_request();
  let resp = test::call_service(&service, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "insufficient_stock");
  assert_eq!(body["product_id"], b.id.to_string());
  assert_eq!(body["requested"], 3);
  assert_eq!(body["available"], 2);
}

#[actix_rt::test]
async fn unknown_product_is_bad_request() {
  let app = spawn_app().await;
  let service = init_app!(app.state.clone());

  let payload = order_request(app.customer_id, &[(Uuid::new_v4(), 1)], ShippingMethod::LocalPickup);
  let req = test::TestRequest::post().uri("/api/v1/orders").set_json(&payload).to_request();
  let resp = test::call_service(&service, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "product_not_found");
}

#[actix_rt::test]
async fn order_lookup_maps_missing_and_malformed_ids() {
  let app = spawn_app().await;
  let service = init_app!(app.state.clone());

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/orders/{}", Uuid::new_v4()))
    .to_request();
  let resp = test::call_service(&service, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::get().uri("/api/v1/orders/not-a-uuid").to_request();
  let resp = test::call_service(&service, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
