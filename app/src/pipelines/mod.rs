// app/src/pipelines/mod.rs

//! Defines and registers the workflows used by the storefront.

use crate::errors::AppError;
use flow::{FlowResult, Workflows};

pub mod contexts;
pub mod place_order_pipeline;

/// Registers every workflow with `workflows`. Called once while building
/// the application state.
pub fn register_all_pipelines(workflows: &Workflows<AppError>) -> FlowResult<()> {
  tracing::info!("Registering pipelines...");

  place_order_pipeline::register_place_order_pipeline(workflows)?;

  tracing::info!("All application pipelines registered.");
  Ok(())
}
