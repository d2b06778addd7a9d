// app/src/models/order.rs

use super::{Address, Money, OrderItem, Payment, Product};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
  Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
  Pending,
  Paid,
  Failed,
  Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "shipping_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
  LocalPickup,
  HomeDelivery,
}

impl ShippingMethod {
  pub fn as_str(self) -> &'static str {
    match self {
      ShippingMethod::LocalPickup => "local_pickup",
      ShippingMethod::HomeDelivery => "home_delivery",
    }
  }
}

impl fmt::Display for ShippingMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
  Stripe,
  Paypal,
  Mercadopago,
  CashOnDelivery,
  BankTransfer,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub delivery_address_id: Uuid,
  pub subtotal_cents: Money,
  pub shipping_cost_cents: Money,
  pub final_amount_cents: Money,
  pub status: OrderStatus,
  pub payment_status: PaymentStatus,
  pub shipping_method: ShippingMethod,
  pub payment_method: PaymentMethod,
  pub customer_notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
  pub customer_id: Uuid,
  pub delivery_address_id: Uuid,
  pub subtotal: Money,
  pub shipping_cost: Money,
  pub final_amount: Money,
  pub status: OrderStatus,
  pub payment_status: PaymentStatus,
  pub shipping_method: ShippingMethod,
  pub payment_method: PaymentMethod,
  pub customer_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemDetails {
  #[serde(flatten)]
  pub item: OrderItem,
  pub product: Product,
}

/// An order with the relations shown on a confirmation page.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
  #[serde(flatten)]
  pub order: Order,
  pub delivery_address: Address,
  pub items: Vec<OrderItemDetails>,
  pub payments: Vec<Payment>,
}
