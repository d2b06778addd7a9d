// app/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::PlaceOrderRequest;
use crate::services::order_service;
use crate::state::AppState;

#[instrument(name = "handler::place_order", skip(app_state, payload))]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
  let details = order_service::place_order(app_state.get_ref(), payload.into_inner()).await?;
  info!(order_id = %details.order.id, "Order created.");
  Ok(HttpResponse::Created().json(details))
}

#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let details = order_service::get_order(app_state.get_ref(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(details))
}
