// app/src/models/order_item.rs

use super::Money;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A purchased line. `price_at_purchase_cents` is the product price read in
/// the placing transaction and is never refreshed from the product afterwards.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_at_purchase_cents: Money,
}

impl OrderItem {
  pub fn line_total(&self) -> Option<Money> {
    self.price_at_purchase_cents.checked_times(self.quantity)
  }
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_at_purchase: Money,
}
