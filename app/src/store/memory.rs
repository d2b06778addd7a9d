// app/src/store/memory.rs

use super::{OrderStore, OrderUnitOfWork, StockUpdate, StoreError};
use crate::models::{
  Address, Money, NewAddress, NewOrder, NewOrderItem, Order, OrderDetails, OrderItem, OrderItemDetails, Payment,
  PaymentMethod, PaymentStatus, Product,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct Tables {
  customers: HashSet<Uuid>,
  products: HashMap<Uuid, Product>,
  addresses: HashMap<Uuid, Address>,
  orders: HashMap<Uuid, Order>,
  order_items: Vec<OrderItem>,
  payments: Vec<Payment>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
  pub addresses: usize,
  pub orders: usize,
  pub order_items: usize,
}

/// Store kept in process memory, used by the test suites.
///
/// A unit of work owns the table lock from `begin` until it commits, rolls
/// back or is dropped, so units of work never interleave.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
  tables: Arc<Mutex<Tables>>,
  fail_next_commit: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn insert_customer(&self) -> Uuid {
    let id = Uuid::new_v4();
    self.tables.lock().await.customers.insert(id);
    id
  }

  pub async fn insert_product(&self, name: &str, price: Money, stock_quantity: i32) -> Product {
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      name: name.to_string(),
      price_cents: price,
      stock_quantity,
      is_active: true,
      created_at: now,
      updated_at: now,
    };
    self.tables.lock().await.products.insert(product.id, product.clone());
    product
  }

  /// Records a gateway payment against an existing order.
  pub async fn insert_payment(
    &self,
    order_id: Uuid,
    amount: Money,
    payment_method: PaymentMethod,
    status: PaymentStatus,
  ) -> Result<Payment, StoreError> {
    let mut tables = self.tables.lock().await;
    if !tables.orders.contains_key(&order_id) {
      return Err(StoreError::ForeignKey {
        operation: "insert_payment",
        message: format!("order {} does not exist", order_id),
      });
    }
    let payment = Payment {
      id: Uuid::new_v4(),
      order_id,
      transaction_id: None,
      amount_cents: amount,
      payment_method,
      status,
      raw_response: None,
      payment_date: Utc::now(),
    };
    tables.payments.push(payment.clone());
    Ok(payment)
  }

  pub async fn product(&self, id: Uuid) -> Option<Product> {
    self.tables.lock().await.products.get(&id).cloned()
  }

  pub async fn counts(&self) -> RowCounts {
    let tables = self.tables.lock().await;
    RowCounts {
      addresses: tables.addresses.len(),
      orders: tables.orders.len(),
      order_items: tables.order_items.len(),
    }
  }

  /// Makes the next commit fail and discard its writes.
  pub fn fail_next_commit(&self) {
    self.fail_next_commit.store(true, Ordering::SeqCst);
  }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
  async fn begin(&self) -> Result<Box<dyn OrderUnitOfWork>, StoreError> {
    let guard = Arc::clone(&self.tables).lock_owned().await;
    let staged = guard.clone();
    debug!("In-memory unit of work started.");
    Ok(Box::new(InMemoryUnitOfWork {
      guard: Some(guard),
      staged,
      fail_commit: Arc::clone(&self.fail_next_commit),
    }))
  }

  #[instrument(skip(self))]
  async fn find_order_details(&self, order_id: Uuid) -> Result<Option<OrderDetails>, StoreError> {
    let tables = self.tables.lock().await;
    let Some(order) = tables.orders.get(&order_id).cloned() else {
      return Ok(None);
    };
    let delivery_address = tables
      .addresses
      .get(&order.delivery_address_id)
      .cloned()
      .ok_or(StoreError::MissingRow {
        table: "addresses",
        id: order.delivery_address_id,
      })?;
    let mut items = tables
      .order_items
      .iter()
      .filter(|item| item.order_id == order_id)
      .map(|item| {
        let product = tables.products.get(&item.product_id).cloned().ok_or(StoreError::MissingRow {
          table: "products",
          id: item.product_id,
        })?;
        Ok(OrderItemDetails {
          item: item.clone(),
          product,
        })
      })
      .collect::<Result<Vec<_>, StoreError>>()?;
    // Same item order as the postgres store.
    items.sort_by_key(|line| line.item.id);
    let payments = tables
      .payments
      .iter()
      .filter(|p| p.order_id == order_id)
      .cloned()
      .collect();

    Ok(Some(OrderDetails {
      order,
      delivery_address,
      items,
      payments,
    }))
  }
}

struct InMemoryUnitOfWork {
  guard: Option<OwnedMutexGuard<Tables>>,
  staged: Tables,
  fail_commit: Arc<AtomicBool>,
}

impl InMemoryUnitOfWork {
  fn tables(&mut self) -> Result<&mut Tables, StoreError> {
    if self.guard.is_none() {
      return Err(StoreError::Finished);
    }
    Ok(&mut self.staged)
  }
}

#[async_trait]
impl OrderUnitOfWork for InMemoryUnitOfWork {
  async fn insert_address(&mut self, address: &NewAddress) -> Result<Address, StoreError> {
    let tables = self.tables()?;
    let row = Address {
      id: Uuid::new_v4(),
      street: address.street.clone(),
      city: address.city.clone(),
      state_province: address.state_province.clone(),
      postal_code: address.postal_code.clone(),
      country: address.country.clone(),
      additional_info: address.additional_info.clone(),
      created_at: Utc::now(),
    };
    tables.addresses.insert(row.id, row.clone());
    Ok(row)
  }

  async fn find_products(&mut self, ids: &[Uuid]) -> Result<Vec<Product>, StoreError> {
    let tables = self.tables()?;
    Ok(ids.iter().filter_map(|id| tables.products.get(id)).cloned().collect())
  }

  async fn decrement_stock(&mut self, product_id: Uuid, quantity: i32) -> Result<StockUpdate, StoreError> {
    let tables = self.tables()?;
    let product = tables.products.get_mut(&product_id).ok_or(StoreError::MissingRow {
      table: "products",
      id: product_id,
    })?;
    if product.stock_quantity < quantity {
      return Ok(StockUpdate::Insufficient {
        available: product.stock_quantity,
      });
    }
    product.stock_quantity -= quantity;
    product.updated_at = Utc::now();
    Ok(StockUpdate::Applied {
      remaining: product.stock_quantity,
    })
  }

  async fn insert_order(&mut self, order: &NewOrder) -> Result<Order, StoreError> {
    let tables = self.tables()?;
    if !tables.customers.contains(&order.customer_id) {
      return Err(StoreError::ForeignKey {
        operation: "insert_order",
        message: format!("customer {} does not exist", order.customer_id),
      });
    }
    if !tables.addresses.contains_key(&order.delivery_address_id) {
      return Err(StoreError::ForeignKey {
        operation: "insert_order",
        message: format!("address {} does not exist", order.delivery_address_id),
      });
    }
    let now = Utc::now();
    let row = Order {
      id: Uuid::new_v4(),
      customer_id: order.customer_id,
      delivery_address_id: order.delivery_address_id,
      subtotal_cents: order.subtotal,
      shipping_cost_cents: order.shipping_cost,
      final_amount_cents: order.final_amount,
      status: order.status,
      payment_status: order.payment_status,
      shipping_method: order.shipping_method,
      payment_method: order.payment_method,
      customer_notes: order.customer_notes.clone(),
      created_at: now,
      updated_at: now,
    };
    tables.orders.insert(row.id, row.clone());
    Ok(row)
  }

  async fn insert_order_items(&mut self, items: &[NewOrderItem]) -> Result<Vec<OrderItem>, StoreError> {
    let tables = self.tables()?;
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
      if !tables.orders.contains_key(&item.order_id) {
        return Err(StoreError::ForeignKey {
          operation: "insert_order_items",
          message: format!("order {} does not exist", item.order_id),
        });
      }
      if !tables.products.contains_key(&item.product_id) {
        return Err(StoreError::ForeignKey {
          operation: "insert_order_items",
          message: format!("product {} does not exist", item.product_id),
        });
      }
      rows.push(OrderItem {
        id: Uuid::new_v4(),
        order_id: item.order_id,
        product_id: item.product_id,
        quantity: item.quantity,
        price_at_purchase_cents: item.price_at_purchase,
      });
    }
    tables.order_items.extend(rows.iter().cloned());
    Ok(rows)
  }

  async fn commit(&mut self) -> Result<(), StoreError> {
    let mut guard = self.guard.take().ok_or(StoreError::Finished)?;
    if self.fail_commit.swap(false, Ordering::SeqCst) {
      return Err(StoreError::Unavailable("commit rejected".to_string()));
    }
    *guard = std::mem::take(&mut self.staged);
    debug!("In-memory unit of work committed.");
    Ok(())
  }

  async fn rollback(&mut self) -> Result<(), StoreError> {
    self.guard.take().ok_or(StoreError::Finished)?;
    self.staged = Tables::default();
    debug!("In-memory unit of work rolled back.");
    Ok(())
  }
}
