// app/src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::{FlatRateShipping, ShippingPolicy};
use crate::store::OrderStore;
use flow::Workflows;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn OrderStore>,
  pub shipping: Arc<dyn ShippingPolicy>,
  pub workflows: Arc<Workflows<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Flat-rate shipping from `config`, with every pipeline registered.
  pub fn new(store: Arc<dyn OrderStore>, config: AppConfig) -> Result<Self, AppError> {
    let shipping = Arc::new(FlatRateShipping::new(config.shipping_fees));
    Self::with_shipping(store, shipping, config)
  }

  pub fn with_shipping(
    store: Arc<dyn OrderStore>,
    shipping: Arc<dyn ShippingPolicy>,
    config: AppConfig,
  ) -> Result<Self, AppError> {
    let workflows = Arc::new(Workflows::<AppError>::new());
    pipelines::register_all_pipelines(&workflows)?;
    Ok(Self {
      store,
      shipping,
      workflows,
      config: Arc::new(config),
    })
  }
}
