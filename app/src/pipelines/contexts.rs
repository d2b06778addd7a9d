// app/src/pipelines/contexts.rs

//! Data carried through pipeline runs. Handlers receive it wrapped in
//! `flow::FlowData`.

use crate::models::{Address, Money, Order, OrderDetails, OrderItem, PlaceOrderRequest, Product, ValidatedOrder};
use crate::state::AppState;
use crate::store::OrderUnitOfWork;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// The open unit of work, shared by the steps of one run. Async mutex because
/// steps hold it across store calls.
pub type SharedUnitOfWork = Arc<Mutex<Box<dyn OrderUnitOfWork>>>;

#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub app_state: AppState,
  pub request: PlaceOrderRequest,
  pub validated: Option<ValidatedOrder>,
  /// `Some` from `open_unit_of_work` until commit. Whoever takes it out owns
  /// the commit or rollback.
  pub unit_of_work: Option<SharedUnitOfWork>,
  pub delivery_address: Option<Address>,
  /// Products locked for this order, keyed by id, with stock as decremented.
  pub products: HashMap<Uuid, Product>,
  pub subtotal: Money,
  pub shipping_cost: Money,
  pub final_amount: Money,
  pub order: Option<Order>,
  pub items: Vec<OrderItem>,
  pub committed: bool,
  /// Post-commit re-read, when it succeeded.
  pub details: Option<OrderDetails>,
}

impl PlaceOrderCtxData {
  pub fn new(app_state: AppState, request: PlaceOrderRequest) -> Self {
    Self {
      app_state,
      request,
      validated: None,
      unit_of_work: None,
      delivery_address: None,
      products: HashMap::new(),
      subtotal: Money::ZERO,
      shipping_cost: Money::ZERO,
      final_amount: Money::ZERO,
      order: None,
      items: Vec::new(),
      committed: false,
      details: None,
    }
  }
}
