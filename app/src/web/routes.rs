// app/src/web/routes.rs

use crate::errors::AppError;
use crate::web::handlers::order_handlers;
use actix_web::{web, HttpResponse};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts the `/api/v1` scope. Malformed JSON bodies and path parameters are
/// answered as validation errors.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(
      web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("invalid request body: {}", err)).into()),
    )
    .app_data(
      web::PathConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("invalid path parameter: {}", err)).into()),
    )
    .service(
      web::scope("/api/v1")
        .route("/health", web::get().to(health_check_handler))
        .service(
          web::scope("/orders")
            .route("", web::post().to(order_handlers::place_order_handler))
            .route("/{order_id}", web::get().to(order_handlers::get_order_handler)),
        ),
    );
}
