// app/src/models/place_order.rs

//! The order placement request as received, and its validated form.

use super::{NewAddress, PaymentMethod, ShippingMethod};
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemRequest {
  #[serde(default)]
  pub product_id: Option<Uuid>,
  #[serde(default)]
  pub quantity: i32,
}

/// Body of `POST /api/v1/orders`. Presence of the required parts is checked
/// by [`PlaceOrderRequest::validate`] so that a missing field is reported the
/// same way as an empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
  #[serde(default)]
  pub customer_id: Option<Uuid>,
  #[serde(default)]
  pub delivery_address: Option<NewAddress>,
  #[serde(default)]
  pub order_items: Option<Vec<LineItemRequest>>,
  pub shipping_method: ShippingMethod,
  pub payment_method: PaymentMethod,
  #[serde(default)]
  pub customer_notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct ValidatedOrder {
  pub customer_id: Uuid,
  pub delivery_address: NewAddress,
  pub lines: Vec<OrderLine>,
  pub shipping_method: ShippingMethod,
  pub payment_method: PaymentMethod,
  pub customer_notes: Option<String>,
}

impl ValidatedOrder {
  /// Product ids in first-seen order, without repeats.
  pub fn distinct_product_ids(&self) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = Vec::with_capacity(self.lines.len());
    for line in &self.lines {
      if !ids.contains(&line.product_id) {
        ids.push(line.product_id);
      }
    }
    ids
  }
}

impl PlaceOrderRequest {
  pub fn validate(&self) -> Result<ValidatedOrder, AppError> {
    let customer_id = self
      .customer_id
      .ok_or_else(|| AppError::Validation("customer_id is required".to_string()))?;

    let delivery_address = self
      .delivery_address
      .clone()
      .ok_or_else(|| AppError::Validation("delivery_address is required".to_string()))?;
    let blank = delivery_address.blank_fields();
    if !blank.is_empty() {
      return Err(AppError::Validation(format!(
        "delivery_address is missing: {}",
        blank.join(", ")
      )));
    }

    let items = match &self.order_items {
      Some(items) if !items.is_empty() => items,
      _ => return Err(AppError::Validation("order_items must contain at least one item".to_string())),
    };
    let lines = items
      .iter()
      .enumerate()
      .map(|(index, item)| {
        let product_id = item
          .product_id
          .ok_or_else(|| AppError::Validation(format!("order_items[{}].product_id is required", index)))?;
        if item.quantity <= 0 {
          return Err(AppError::Validation(format!(
            "order_items[{}].quantity must be positive",
            index
          )));
        }
        Ok(OrderLine {
          product_id,
          quantity: item.quantity,
        })
      })
      .collect::<Result<Vec<_>, AppError>>()?;

    Ok(ValidatedOrder {
      customer_id,
      delivery_address,
      lines,
      shipping_method: self.shipping_method,
      payment_method: self.payment_method,
      customer_notes: self.customer_notes.clone(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request() -> PlaceOrderRequest {
    PlaceOrderRequest {
      customer_id: Some(Uuid::new_v4()),
      delivery_address: Some(NewAddress {
        street: "1 Main St".into(),
        city: "Springfield".into(),
        state_province: None,
        postal_code: "12345".into(),
        country: "US".into(),
        additional_info: None,
      }),
      order_items: Some(vec![LineItemRequest {
        product_id: Some(Uuid::new_v4()),
        quantity: 1,
      }]),
      shipping_method: ShippingMethod::HomeDelivery,
      payment_method: PaymentMethod::Stripe,
      customer_notes: None,
    }
  }

  fn validation_message(req: &PlaceOrderRequest) -> String {
    match req.validate() {
      Err(AppError::Validation(message)) => message,
      other => panic!("expected validation error, got {:?}", other),
    }
  }

  #[test]
  fn accepts_complete_request() {
    let validated = request().validate().unwrap();
    assert_eq!(validated.lines.len(), 1);
  }

  #[test]
  fn rejects_missing_parts() {
    let mut req = request();
    req.customer_id = None;
    assert!(validation_message(&req).contains("customer_id"));

    let mut req = request();
    req.order_items = Some(vec![]);
    assert!(validation_message(&req).contains("order_items"));

    let mut req = request();
    req.order_items = None;
    assert!(validation_message(&req).contains("order_items"));
  }

  #[test]
  fn rejects_blank_address_fields() {
    let mut req = request();
    if let Some(address) = req.delivery_address.as_mut() {
      address.city = "  ".into();
      address.country = String::new();
    }
    let message = validation_message(&req);
    assert!(message.contains("city"));
    assert!(message.contains("country"));
  }

  #[test]
  fn rejects_non_positive_quantity() {
    let mut req = request();
    req.order_items = Some(vec![LineItemRequest {
      product_id: Some(Uuid::new_v4()),
      quantity: 0,
    }]);
    assert!(validation_message(&req).contains("order_items[0].quantity"));
  }

  #[test]
  fn distinct_ids_keep_first_seen_order() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let mut req = request();
    req.order_items = Some(vec![
      LineItemRequest { product_id: Some(a), quantity: 1 },
      LineItemRequest { product_id: Some(b), quantity: 1 },
      LineItemRequest { product_id: Some(a), quantity: 2 },
    ]);
    assert_eq!(req.validate().unwrap().distinct_product_ids(), vec![a, b]);
  }
}
