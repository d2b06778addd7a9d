// app/src/services/order_service.rs

//! Entry points used by the HTTP handlers (and tests) to place and read orders.

use crate::errors::AppError;
use crate::models::{OrderDetails, OrderItemDetails, PlaceOrderRequest};
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::state::AppState;
use flow::{FlowData, FlowOutcome};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Runs the order placement workflow.
///
/// Either the address, the order and all of its items are committed together
/// with the stock decrements, or nothing is. When a step fails the open unit
/// of work is rolled back and the step's error is returned unchanged, even if
/// the rollback itself fails.
#[instrument(name = "service::place_order", skip_all, fields(customer_id = ?request.customer_id))]
pub async fn place_order(state: &AppState, request: PlaceOrderRequest) -> Result<OrderDetails, AppError> {
  let ctx = FlowData::new(PlaceOrderCtxData::new(state.clone(), request));

  let outcome = state.workflows.run(ctx.clone()).await;
  let committed = ctx.read().committed;
  match outcome {
    Ok(FlowOutcome::Completed) if committed => {}
    Ok(outcome) => {
      warn!(?outcome, "Order workflow ended without committing.");
      roll_back_open_unit_of_work(&ctx).await;
      return Err(AppError::Internal("order placement ended before commit".to_string()));
    }
    Err(e) => {
      roll_back_open_unit_of_work(&ctx).await;
      return Err(e);
    }
  }

  let details = match ctx.take(|d| &mut d.details) {
    Some(details) => details,
    None => details_from_written_rows(&ctx)?,
  };
  info!(order_id = %details.order.id, items = details.items.len(), "Order placed.");
  Ok(details)
}

#[instrument(name = "service::get_order", skip(state))]
pub async fn get_order(state: &AppState, order_id: Uuid) -> Result<OrderDetails, AppError> {
  state
    .store
    .find_order_details(order_id)
    .await?
    .ok_or(AppError::OrderNotFound(order_id))
}

async fn roll_back_open_unit_of_work(ctx: &FlowData<PlaceOrderCtxData>) {
  let Some(uow) = ctx.take(|d| &mut d.unit_of_work) else {
    return;
  };
  let mut guard = uow.lock().await;
  match guard.rollback().await {
    Ok(()) => info!("Order unit of work rolled back."),
    Err(e) => error!(error = %e, "Rollback failed; returning the original error."),
  };
}

/// Builds the response from the rows written in the committed unit of work.
/// Used when the post-commit re-read did not produce anything.
fn details_from_written_rows(ctx: &FlowData<PlaceOrderCtxData>) -> Result<OrderDetails, AppError> {
  let guard = ctx.read();
  let order = guard
    .order
    .clone()
    .ok_or_else(|| AppError::Internal("committed order is missing from the workflow".to_string()))?;
  let delivery_address = guard
    .delivery_address
    .clone()
    .ok_or_else(|| AppError::Internal("committed address is missing from the workflow".to_string()))?;
  let items = guard
    .items
    .iter()
    .map(|item| {
      let product = guard
        .products
        .get(&item.product_id)
        .cloned()
        .ok_or(AppError::ProductNotFound(item.product_id))?;
      Ok(OrderItemDetails {
        item: item.clone(),
        product,
      })
    })
    .collect::<Result<Vec<_>, AppError>>()?;

  Ok(OrderDetails {
    order,
    delivery_address,
    items,
    payments: Vec::new(),
  })
}
