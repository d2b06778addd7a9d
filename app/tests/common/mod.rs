// app/tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storefront::config::{AppConfig, LogFormat, ShippingFees};
use storefront::models::{
  Address, LineItemRequest, Money, NewAddress, NewOrder, NewOrderItem, Order, OrderDetails, OrderItem, PaymentMethod,
  PlaceOrderRequest, Product, ShippingMethod,
};
use storefront::state::AppState;
use storefront::store::{InMemoryOrderStore, OrderStore, OrderUnitOfWork, StockUpdate, StoreError};
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn test_config() -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    database_url: String::new(),
    database_max_connections: 1,
    shipping_fees: ShippingFees::default(),
    log_format: LogFormat::Pretty,
  }
}

/// In-memory store wrapper that counts `begin` calls and can fail the
/// post-commit re-read.
pub struct CountingStore {
  pub inner: InMemoryOrderStore,
  pub begins: AtomicUsize,
  pub fail_reads: bool,
}

#[async_trait]
impl OrderStore for CountingStore {
  async fn begin(&self) -> Result<Box<dyn OrderUnitOfWork>, StoreError> {
    self.begins.fetch_add(1, Ordering::SeqCst);
    self.inner.begin().await
  }

  async fn find_order_details(&self, order_id: Uuid) -> Result<Option<OrderDetails>, StoreError> {
    if self.fail_reads {
      return Err(StoreError::Unavailable("read replica offline".to_string()));
    }
    self.inner.find_order_details(order_id).await
  }
}

/// Store whose units of work find every product sold out at decrement time,
/// as when a concurrent order took the stock after the products were read.
pub struct SoldOutAtDecrementStore {
  pub inner: InMemoryOrderStore,
}

#[async_trait]
impl OrderStore for SoldOutAtDecrementStore {
  async fn begin(&self) -> Result<Box<dyn OrderUnitOfWork>, StoreError> {
    let inner = self.inner.begin().await?;
    Ok(Box::new(SoldOutAtDecrement { inner }))
  }

  async fn find_order_details(&self, order_id: Uuid) -> Result<Option<OrderDetails>, StoreError> {
    self.inner.find_order_details(order_id).await
  }
}

struct SoldOutAtDecrement {
  inner: Box<dyn OrderUnitOfWork>,
}

#[async_trait]
impl OrderUnitOfWork for SoldOutAtDecrement {
  async fn insert_address(&mut self, address: &NewAddress) -> Result<Address, StoreError> {
    self.inner.insert_address(address).await
  }

  async fn find_products(&mut self, ids: &[Uuid]) -> Result<Vec<Product>, StoreError> {
    self.inner.find_products(ids).await
  }

  async fn decrement_stock(&mut self, _product_id: Uuid, _quantity: i32) -> Result<StockUpdate, StoreError> {
    Ok(StockUpdate::Insufficient { available: 0 })
  }

  async fn insert_order(&mut self, order: &NewOrder) -> Result<Order, StoreError> {
    self.inner.insert_order(order).await
  }

  async fn insert_order_items(&mut self, items: &[NewOrderItem]) -> Result<Vec<OrderItem>, StoreError> {
    self.inner.insert_order_items(items).await
  }

  async fn commit(&mut self) -> Result<(), StoreError> {
    self.inner.commit().await
  }

  async fn rollback(&mut self) -> Result<(), StoreError> {
    self.inner.rollback().await
  }
}

pub struct TestApp {
  pub state: AppState,
  pub store: InMemoryOrderStore,
  pub counting: Arc<CountingStore>,
  pub customer_id: Uuid,
}

impl TestApp {
  pub fn begins(&self) -> usize {
    self.counting.begins.load(Ordering::SeqCst)
  }
}

async fn build(config: AppConfig, fail_reads: bool) -> TestApp {
  setup_tracing();
  let store = InMemoryOrderStore::new();
  let customer_id = store.insert_customer().await;
  let counting = Arc::new(CountingStore {
    inner: store.clone(),
    begins: AtomicUsize::new(0),
    fail_reads,
  });
  let state = AppState::new(counting.clone(), config).expect("pipelines register");
  TestApp {
    state,
    store,
    counting,
    customer_id,
  }
}

pub async fn spawn_app() -> TestApp {
  build(test_config(), false).await
}

pub async fn spawn_app_with_config(config: AppConfig) -> TestApp {
  build(config, false).await
}

pub async fn spawn_app_with_failing_reads() -> TestApp {
  build(test_config(), true).await
}

pub fn address() -> NewAddress {
  NewAddress {
    street: "742 Evergreen Terrace".to_string(),
    city: "Springfield".to_string(),
    state_province: Some("OR".to_string()),
    postal_code: "97403".to_string(),
    country: "US".to_string(),
    additional_info: None,
  }
}

pub fn order_request(customer_id: Uuid, lines: &[(Uuid, i32)], shipping_method: ShippingMethod) -> PlaceOrderRequest {
  PlaceOrderRequest {
    customer_id: Some(customer_id),
    delivery_address: Some(address()),
    order_items: Some(
      lines
        .iter()
        .map(|(product_id, quantity)| LineItemRequest {
          product_id: Some(*product_id),
          quantity: *quantity,
        })
        .collect(),
    ),
    shipping_method,
    payment_method: PaymentMethod::CashOnDelivery,
    customer_notes: Some("Leave at the door".to_string()),
  }
}

/// Product A at 10.00 with 5 in stock and B at 3.50 with 2 in stock.
pub async fn seed_catalog(store: &InMemoryOrderStore) -> (Product, Product) {
  let a = store.insert_product("Product A", Money::from_cents(1000), 5).await;
  let b = store.insert_product("Product B", Money::from_cents(350), 2).await;
  (a, b)
}

pub async fn stock_of(store: &InMemoryOrderStore, product_id: Uuid) -> i32 {
  store.product(product_id).await.map(|p| p.stock_quantity).unwrap_or(-1)
}
