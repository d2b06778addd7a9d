// app/src/services/mod.rs

pub mod order_service;
pub mod shipping;

pub use shipping::{FlatRateShipping, ShippingPolicy};
