// app/src/pipelines/place_order_pipeline.rs

//! Order placement: validate, then reserve stock and write the order graph
//! inside a single unit of work.
//!
//! Steps never roll back themselves. A failing step returns its error and
//! leaves the unit of work in the context; the caller rolls it back (see
//! `services::order_service::place_order`).

use crate::errors::AppError;
use crate::models::{Money, NewOrder, NewOrderItem, OrderStatus, PaymentStatus, ValidatedOrder};
use crate::pipelines::contexts::{PlaceOrderCtxData, SharedUnitOfWork};
use crate::store::{StockUpdate, StoreError};
use flow::{FlowData, FlowResult, Pipeline, SkipCondition, StepControl, Workflows};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

pub const STEP_NAMES: [&str; 10] = [
  "validate_order_request",
  "open_unit_of_work",
  "insert_delivery_address",
  "load_products",
  "reserve_stock",
  "price_shipping",
  "insert_order",
  "insert_order_items",
  "commit_unit_of_work",
  "load_order_details",
];

pub fn build_place_order_pipeline() -> FlowResult<Pipeline<PlaceOrderCtxData, AppError>> {
  let not_committed: SkipCondition<PlaceOrderCtxData> =
    Arc::new(|ctx: FlowData<PlaceOrderCtxData>| !ctx.read().committed);

  let mut p = Pipeline::<PlaceOrderCtxData, AppError>::new(&[
    ("validate_order_request", false, None),
    ("open_unit_of_work", false, None),
    ("insert_delivery_address", false, None),
    ("load_products", false, None),
    ("reserve_stock", false, None),
    ("price_shipping", false, None),
    ("insert_order", false, None),
    ("insert_order_items", false, None),
    ("commit_unit_of_work", false, None),
    ("load_order_details", true, Some(not_committed)),
  ]);

  p.on_step("validate_order_request", validate_order_request)?;
  p.on_step("open_unit_of_work", open_unit_of_work)?;
  p.on_step("insert_delivery_address", insert_delivery_address)?;
  p.on_step("load_products", load_products)?;
  p.on_step("reserve_stock", reserve_stock)?;
  p.on_step("price_shipping", price_shipping)?;
  p.on_step("insert_order", insert_order)?;
  p.on_step("insert_order_items", insert_order_items)?;
  p.on_step("commit_unit_of_work", commit_unit_of_work)?;
  p.on_step("load_order_details", load_order_details)?;

  Ok(p)
}

pub fn register_place_order_pipeline(workflows: &Workflows<AppError>) -> FlowResult<()> {
  workflows.register(build_place_order_pipeline()?);
  Ok(())
}

fn open_uow(ctx: &FlowData<PlaceOrderCtxData>) -> Result<SharedUnitOfWork, AppError> {
  ctx
    .read()
    .unit_of_work
    .clone()
    .ok_or_else(|| AppError::Internal("no open unit of work".to_string()))
}

fn validated<R>(
  ctx: &FlowData<PlaceOrderCtxData>,
  f: impl FnOnce(&ValidatedOrder) -> R,
) -> Result<R, AppError> {
  let guard = ctx.read();
  let order = guard
    .validated
    .as_ref()
    .ok_or_else(|| AppError::Internal("order request was not validated".to_string()))?;
  Ok(f(order))
}

fn too_large() -> AppError {
  AppError::Validation("order total is too large".to_string())
}

#[instrument(name = "step::validate_order_request", skip_all, err(Display))]
async fn validate_order_request(ctx: FlowData<PlaceOrderCtxData>) -> Result<StepControl, AppError> {
  let validated = ctx.read().request.validate()?;
  debug!(
    customer_id = %validated.customer_id,
    lines = validated.lines.len(),
    "Order request is valid."
  );
  ctx.write().validated = Some(validated);
  Ok(StepControl::Continue)
}

#[instrument(name = "step::open_unit_of_work", skip_all, err(Display))]
async fn open_unit_of_work(ctx: FlowData<PlaceOrderCtxData>) -> Result<StepControl, AppError> {
  let store = ctx.read().app_state.store.clone();
  let uow = store
    .begin()
    .await
    .map_err(|e| AppError::Transaction(format!("could not begin transaction: {}", e)))?;
  ctx.write().unit_of_work = Some(Arc::new(Mutex::new(uow)));
  Ok(StepControl::Continue)
}

#[instrument(name = "step::insert_delivery_address", skip_all, err(Display))]
async fn insert_delivery_address(ctx: FlowData<PlaceOrderCtxData>) -> Result<StepControl, AppError> {
  let uow = open_uow(&ctx)?;
  let address = validated(&ctx, |v| v.delivery_address.clone())?;
  let row = uow.lock().await.insert_address(&address).await?;
  debug!(address_id = %row.id, "Delivery address stored.");
  ctx.write().delivery_address = Some(row);
  Ok(StepControl::Continue)
}

#[instrument(name = "step::load_products", skip_all, err(Display))]
async fn load_products(ctx: FlowData<PlaceOrderCtxData>) -> Result<StepControl, AppError> {
  let uow = open_uow(&ctx)?;
  let ids = validated(&ctx, ValidatedOrder::distinct_product_ids)?;
  let found = uow.lock().await.find_products(&ids).await?;

  let products: HashMap<_, _> = found.into_iter().map(|p| (p.id, p)).collect();
  let missing: Vec<_> = ids.iter().filter(|id| !products.contains_key(*id)).copied().collect();
  if !missing.is_empty() {
    warn!(?missing, "Order references unknown products.");
    return Err(AppError::ProductsNotFound { missing });
  }

  ctx.write().products = products;
  Ok(StepControl::Continue)
}

/// Walks the lines in request order. Each line is checked against the local
/// copy first, then the store applies a guarded decrement that re-checks it.
#[instrument(name = "step::reserve_stock", skip_all, err(Display))]
async fn reserve_stock(ctx: FlowData<PlaceOrderCtxData>) -> Result<StepControl, AppError> {
  let uow = open_uow(&ctx)?;
  let lines = validated(&ctx, |v| v.lines.clone())?;
  let mut products = ctx.read().products.clone();
  let mut subtotal = Money::ZERO;

  let mut uow = uow.lock().await;
  for line in &lines {
    let product = products
      .get_mut(&line.product_id)
      .ok_or(AppError::ProductNotFound(line.product_id))?;

    if product.stock_quantity < line.quantity {
      warn!(product_id = %product.id, requested = line.quantity, available = product.stock_quantity, "Insufficient stock.");
      return Err(AppError::InsufficientStock {
        product_id: product.id,
        product_name: product.name.clone(),
        requested: line.quantity,
        available: product.stock_quantity,
      });
    }

    let line_total = product.price_cents.checked_times(line.quantity).ok_or_else(too_large)?;
    subtotal = subtotal.checked_add(line_total).ok_or_else(too_large)?;
    product.stock_quantity -= line.quantity;

    match uow.decrement_stock(product.id, line.quantity).await? {
      StockUpdate::Applied { remaining } => product.stock_quantity = remaining,
      StockUpdate::Insufficient { available } => {
        warn!(product_id = %product.id, requested = line.quantity, available, "Stock changed concurrently.");
        return Err(AppError::InsufficientStock {
          product_id: product.id,
          product_name: product.name.clone(),
          requested: line.quantity,
          available,
        });
      }
    }
  }
  drop(uow);

  debug!(%subtotal, "Stock reserved.");
  let mut guard = ctx.write();
  guard.products = products;
  guard.subtotal = subtotal;
  Ok(StepControl::Continue)
}

#[instrument(name = "step::price_shipping", skip_all, err(Display))]
async fn price_shipping(ctx: FlowData<PlaceOrderCtxData>) -> Result<StepControl, AppError> {
  let (policy, subtotal) = {
    let guard = ctx.read();
    (guard.app_state.shipping.clone(), guard.subtotal)
  };
  let method = validated(&ctx, |v| v.shipping_method)?;

  let shipping_cost = policy
    .shipping_cost(method, subtotal)
    .ok_or_else(|| AppError::Validation(format!("shipping method {} is not available", method)))?;
  let final_amount = subtotal.checked_add(shipping_cost).ok_or_else(too_large)?;

  let mut guard = ctx.write();
  guard.shipping_cost = shipping_cost;
  guard.final_amount = final_amount;
  Ok(StepControl::Continue)
}

#[instrument(name = "step::insert_order", skip_all, err(Display))]
async fn insert_order(ctx: FlowData<PlaceOrderCtxData>) -> Result<StepControl, AppError> {
  let uow = open_uow(&ctx)?;
  let new_order = {
    let guard = ctx.read();
    let validated = guard
      .validated
      .as_ref()
      .ok_or_else(|| AppError::Internal("order request was not validated".to_string()))?;
    let address = guard
      .delivery_address
      .as_ref()
      .ok_or_else(|| AppError::Internal("delivery address was not stored".to_string()))?;
    NewOrder {
      customer_id: validated.customer_id,
      delivery_address_id: address.id,
      subtotal: guard.subtotal,
      shipping_cost: guard.shipping_cost,
      final_amount: guard.final_amount,
      status: OrderStatus::Processing,
      // No payment is captured here; orders are recorded as paid on creation.
      payment_status: PaymentStatus::Paid,
      shipping_method: validated.shipping_method,
      payment_method: validated.payment_method,
      customer_notes: validated.customer_notes.clone(),
    }
  };

  let order = uow.lock().await.insert_order(&new_order).await.map_err(|e| match e {
    StoreError::ForeignKey { .. } => AppError::Validation(format!("unknown customer {}", new_order.customer_id)),
    other => AppError::Store(other),
  })?;
  info!(order_id = %order.id, final_amount = %order.final_amount_cents, "Order row inserted.");
  ctx.write().order = Some(order);
  Ok(StepControl::Continue)
}

#[instrument(name = "step::insert_order_items", skip_all, err(Display))]
async fn insert_order_items(ctx: FlowData<PlaceOrderCtxData>) -> Result<StepControl, AppError> {
  let uow = open_uow(&ctx)?;
  let new_items = {
    let guard = ctx.read();
    let order_id = guard
      .order
      .as_ref()
      .map(|o| o.id)
      .ok_or_else(|| AppError::Internal("order was not inserted".to_string()))?;
    let lines = guard
      .validated
      .as_ref()
      .map(|v| v.lines.as_slice())
      .ok_or_else(|| AppError::Internal("order request was not validated".to_string()))?;
    lines
      .iter()
      .map(|line| {
        let product = guard
          .products
          .get(&line.product_id)
          .ok_or(AppError::ProductNotFound(line.product_id))?;
        Ok(NewOrderItem {
          order_id,
          product_id: line.product_id,
          quantity: line.quantity,
          price_at_purchase: product.price_cents,
        })
      })
      .collect::<Result<Vec<_>, AppError>>()?
  };

  let items = uow.lock().await.insert_order_items(&new_items).await?;
  debug!(count = items.len(), "Order items inserted.");
  ctx.write().items = items;
  Ok(StepControl::Continue)
}

#[instrument(name = "step::commit_unit_of_work", skip_all, err(Display))]
async fn commit_unit_of_work(ctx: FlowData<PlaceOrderCtxData>) -> Result<StepControl, AppError> {
  let uow = ctx
    .take(|d| &mut d.unit_of_work)
    .ok_or_else(|| AppError::Internal("no open unit of work".to_string()))?;
  uow
    .lock()
    .await
    .commit()
    .await
    .map_err(|e| AppError::Transaction(format!("commit failed: {}", e)))?;
  ctx.write().committed = true;
  info!("Order committed.");
  Ok(StepControl::Continue)
}

/// Re-reads the committed order with its relations. A failure here is only
/// logged; the caller falls back to what was written.
#[instrument(name = "step::load_order_details", skip_all)]
async fn load_order_details(ctx: FlowData<PlaceOrderCtxData>) -> Result<StepControl, AppError> {
  let (store, order_id) = {
    let guard = ctx.read();
    (guard.app_state.store.clone(), guard.order.as_ref().map(|o| o.id))
  };
  let Some(order_id) = order_id else {
    return Ok(StepControl::Continue);
  };

  match store.find_order_details(order_id).await {
    Ok(Some(details)) => ctx.write().details = Some(details),
    Ok(None) => warn!(%order_id, "Committed order not visible on re-read."),
    Err(e) => warn!(%order_id, error = %e, "Re-reading committed order failed."),
  }
  Ok(StepControl::Continue)
}
