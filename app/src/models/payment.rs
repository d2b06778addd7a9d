// app/src/models/payment.rs

use super::{Money, PaymentMethod, PaymentStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Gateway payment recorded against an order. Orders are placed without one;
/// rows only show up when presenting an order.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
  pub id: Uuid,
  pub order_id: Uuid,
  pub transaction_id: Option<String>,
  pub amount_cents: Money,
  pub payment_method: PaymentMethod,
  pub status: PaymentStatus,
  pub raw_response: Option<serde_json::Value>,
  pub payment_date: DateTime<Utc>,
}
