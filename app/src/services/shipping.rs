// app/src/services/shipping.rs

use crate::config::ShippingFees;
use crate::models::{Money, ShippingMethod};

/// Decides what an order pays for shipping.
pub trait ShippingPolicy: Send + Sync {
  /// `None` when the method has no rate configured.
  fn shipping_cost(&self, method: ShippingMethod, subtotal: Money) -> Option<Money>;
}

/// One fixed fee per shipping method, whatever the subtotal.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatRateShipping {
  fees: ShippingFees,
}

impl FlatRateShipping {
  pub fn new(fees: ShippingFees) -> Self {
    Self { fees }
  }
}

impl ShippingPolicy for FlatRateShipping {
  fn shipping_cost(&self, method: ShippingMethod, _subtotal: Money) -> Option<Money> {
    match method {
      ShippingMethod::HomeDelivery => self.fees.home_delivery,
      ShippingMethod::LocalPickup => self.fees.local_pickup,
    }
  }
}
