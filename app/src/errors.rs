// app/src/errors.rs

use crate::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use flow::FlowError;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Products not found: {}", format_ids(.missing))]
  ProductsNotFound { missing: Vec<Uuid> },

  #[error("Product not found: {0}")]
  ProductNotFound(Uuid),

  #[error("Insufficient stock for {product_name} ({product_id}): requested {requested}, available {available}")]
  InsufficientStock {
    product_id: Uuid,
    product_name: String,
    requested: i32,
    available: i32,
  },

  #[error("Order not found: {0}")]
  OrderNotFound(Uuid),

  #[error("Transaction Error: {0}")]
  Transaction(String),

  #[error("Store Error: {0}")]
  Store(#[from] StoreError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

fn format_ids(ids: &[Uuid]) -> String {
  ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(", ")
}

impl AppError {
  /// Short machine-readable kind, used as the `error` field of responses.
  pub fn kind(&self) -> &'static str {
    match self {
      AppError::Validation(_) => "validation",
      AppError::ProductsNotFound { .. } | AppError::ProductNotFound(_) => "product_not_found",
      AppError::InsufficientStock { .. } => "insufficient_stock",
      AppError::OrderNotFound(_) => "order_not_found",
      AppError::Transaction(_) => "transaction",
      AppError::Store(_) => "store",
      AppError::Config(_) => "configuration",
      AppError::Workflow { .. } => "workflow",
      AppError::Internal(_) => "internal",
    }
  }

  fn body(&self) -> Value {
    match self {
      AppError::InsufficientStock {
        product_id,
        requested,
        available,
        ..
      } => json!({
        "error": self.kind(),
        "message": self.to_string(),
        "product_id": product_id,
        "requested": requested,
        "available": available,
      }),
      AppError::ProductsNotFound { missing } => json!({
        "error": self.kind(),
        "message": self.to_string(),
        "missing_product_ids": missing,
      }),
      // Infrastructure details stay in the logs.
      AppError::Store(_) | AppError::Workflow { .. } | AppError::Internal(_) => json!({
        "error": self.kind(),
        "message": "An internal error occurred",
      }),
      _ => json!({
        "error": self.kind(),
        "message": self.to_string(),
      }),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::ProductsNotFound { .. } | AppError::ProductNotFound(_) => {
        StatusCode::BAD_REQUEST
      }
      AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
      AppError::OrderNotFound(_) => StatusCode::NOT_FOUND,
      AppError::Transaction(_)
      | AppError::Store(_)
      | AppError::Config(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::info!(application_error = %self, status = status.as_u16(), "Responding with client error");
    }
    HttpResponse::build(status).json(self.body())
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_codes_follow_error_kind() {
    assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
      AppError::ProductsNotFound { missing: vec![Uuid::nil()] }.status_code(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      AppError::InsufficientStock {
        product_id: Uuid::nil(),
        product_name: "Mug".into(),
        requested: 3,
        available: 2,
      }
      .status_code(),
      StatusCode::CONFLICT
    );
    assert_eq!(AppError::OrderNotFound(Uuid::nil()).status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
      AppError::Transaction("commit".into()).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn stock_body_carries_quantities() {
    let body = AppError::InsufficientStock {
      product_id: Uuid::nil(),
      product_name: "Mug".into(),
      requested: 3,
      available: 2,
    }
    .body();
    assert_eq!(body["error"], "insufficient_stock");
    assert_eq!(body["requested"], 3);
    assert_eq!(body["available"], 2);
  }

  #[test]
  fn missing_ids_are_listed_in_message() {
    let id = Uuid::new_v4();
    let err = AppError::ProductsNotFound { missing: vec![id] };
    assert!(err.to_string().contains(&id.to_string()));
  }
}
