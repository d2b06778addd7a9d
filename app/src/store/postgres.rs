// app/src/store/postgres.rs

//! PostgreSQL store over a `sqlx` pool. Tables and enum types are described
//! in `schema.sql` at the crate root.
//!
//! sqlx errors map to [`StoreError`] as follows:
//!
//! | sqlx error | SQLSTATE | StoreError |
//! |------------|----------|------------|
//! | Database (foreign key violation) | `23503` | `ForeignKey` |
//! | anything else | | `Database` |

use super::{OrderStore, OrderUnitOfWork, StockUpdate, StoreError};
use crate::models::{
  Address, NewAddress, NewOrder, NewOrderItem, Order, OrderDetails, OrderItem, OrderItemDetails, Payment, Product,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

const ADDRESS_COLUMNS: &str = "id, street, city, state_province, postal_code, country, additional_info, created_at";
const PRODUCT_COLUMNS: &str = "id, name, price_cents, stock_quantity, is_active, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, customer_id, delivery_address_id, subtotal_cents, shipping_cost_cents, \
  final_amount_cents, status, payment_status, shipping_method, payment_method, customer_notes, created_at, updated_at";
const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, price_at_purchase_cents";
const PAYMENT_COLUMNS: &str =
  "id, order_id, transaction_id, amount_cents, payment_method, status, raw_response, payment_date";

#[derive(Debug, Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(skip(self), err(Display))]
  async fn begin(&self) -> Result<Box<dyn OrderUnitOfWork>, StoreError> {
    let tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin", e))?;
    Ok(Box::new(PgUnitOfWork { tx: Some(tx) }))
  }

  #[instrument(skip(self), err(Display))]
  async fn find_order_details(&self, order_id: Uuid) -> Result<Option<OrderDetails>, StoreError> {
    let order: Option<Order> = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| map_sqlx_error("find_order", e))?;
    let Some(order) = order else {
      return Ok(None);
    };

    let delivery_address: Address = sqlx::query_as(&format!("SELECT {} FROM addresses WHERE id = $1", ADDRESS_COLUMNS))
      .bind(order.delivery_address_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| map_sqlx_error("find_order_address", e))?
      .ok_or(StoreError::MissingRow {
        table: "addresses",
        id: order.delivery_address_id,
      })?;

    let items: Vec<OrderItem> = sqlx::query_as(&format!(
      "SELECT {} FROM order_items WHERE order_id = $1 ORDER BY id",
      ORDER_ITEM_COLUMNS
    ))
    .bind(order_id)
    .fetch_all(&self.pool)
    .await
    .map_err(|e| map_sqlx_error("find_order_items", e))?;

    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let products: HashMap<Uuid, Product> = sqlx::query_as::<_, Product>(&format!(
      "SELECT {} FROM products WHERE id = ANY($1)",
      PRODUCT_COLUMNS
    ))
    .bind(&product_ids)
    .fetch_all(&self.pool)
    .await
    .map_err(|e| map_sqlx_error("find_order_products", e))?
    .into_iter()
    .map(|p| (p.id, p))
    .collect();

    let items = items
      .into_iter()
      .map(|item| {
        let product = products.get(&item.product_id).cloned().ok_or(StoreError::MissingRow {
          table: "products",
          id: item.product_id,
        })?;
        Ok(OrderItemDetails { item, product })
      })
      .collect::<Result<Vec<_>, StoreError>>()?;

    let payments: Vec<Payment> = sqlx::query_as(&format!(
      "SELECT {} FROM payments WHERE order_id = $1 ORDER BY payment_date",
      PAYMENT_COLUMNS
    ))
    .bind(order_id)
    .fetch_all(&self.pool)
    .await
    .map_err(|e| map_sqlx_error("find_order_payments", e))?;

    Ok(Some(OrderDetails {
      order,
      delivery_address,
      items,
      payments,
    }))
  }
}

/// One PostgreSQL transaction. Dropping it without `commit` rolls back.
pub struct PgUnitOfWork {
  tx: Option<Transaction<'static, Postgres>>,
}

impl PgUnitOfWork {
  fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>, StoreError> {
    self.tx.as_mut().ok_or(StoreError::Finished)
  }
}

#[async_trait]
impl OrderUnitOfWork for PgUnitOfWork {
  async fn insert_address(&mut self, address: &NewAddress) -> Result<Address, StoreError> {
    let tx = self.tx()?;
    sqlx::query_as(&format!(
      "INSERT INTO addresses (id, street, city, state_province, postal_code, country, additional_info) \
       VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
      ADDRESS_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&address.street)
    .bind(&address.city)
    .bind(&address.state_province)
    .bind(&address.postal_code)
    .bind(&address.country)
    .bind(&address.additional_info)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_address", e))
  }

  async fn find_products(&mut self, ids: &[Uuid]) -> Result<Vec<Product>, StoreError> {
    let tx = self.tx()?;
    // Lock in id order so concurrent orders over the same products cannot deadlock.
    sqlx::query_as(&format!(
      "SELECT {} FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
      PRODUCT_COLUMNS
    ))
    .bind(ids)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("find_products", e))
  }

  async fn decrement_stock(&mut self, product_id: Uuid, quantity: i32) -> Result<StockUpdate, StoreError> {
    let tx = self.tx()?;
    let remaining: Option<i32> = sqlx::query_scalar(
      "UPDATE products SET stock_quantity = stock_quantity - $2, updated_at = now() \
       WHERE id = $1 AND stock_quantity >= $2 RETURNING stock_quantity",
    )
    .bind(product_id)
    .bind(quantity)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("decrement_stock", e))?;

    if let Some(remaining) = remaining {
      return Ok(StockUpdate::Applied { remaining });
    }

    let available: Option<i32> = sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
      .bind(product_id)
      .fetch_optional(&mut **tx)
      .await
      .map_err(|e| map_sqlx_error("decrement_stock", e))?;
    match available {
      Some(available) => Ok(StockUpdate::Insufficient { available }),
      None => Err(StoreError::MissingRow {
        table: "products",
        id: product_id,
      }),
    }
  }

  async fn insert_order(&mut self, order: &NewOrder) -> Result<Order, StoreError> {
    let tx = self.tx()?;
    sqlx::query_as(&format!(
      "INSERT INTO orders (id, customer_id, delivery_address_id, subtotal_cents, shipping_cost_cents, \
       final_amount_cents, status, payment_status, shipping_method, payment_method, customer_notes) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(order.customer_id)
    .bind(order.delivery_address_id)
    .bind(order.subtotal)
    .bind(order.shipping_cost)
    .bind(order.final_amount)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(order.shipping_method)
    .bind(order.payment_method)
    .bind(&order.customer_notes)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_order", e))
  }

  async fn insert_order_items(&mut self, items: &[NewOrderItem]) -> Result<Vec<OrderItem>, StoreError> {
    if items.is_empty() {
      return Ok(Vec::new());
    }
    let tx = self.tx()?;
    let mut builder: QueryBuilder<Postgres> =
      QueryBuilder::new("INSERT INTO order_items (id, order_id, product_id, quantity, price_at_purchase_cents) ");
    builder.push_values(items, |mut row, item| {
      row
        .push_bind(Uuid::new_v4())
        .push_bind(item.order_id)
        .push_bind(item.product_id)
        .push_bind(item.quantity)
        .push_bind(item.price_at_purchase);
    });
    builder.push(" RETURNING ");
    builder.push(ORDER_ITEM_COLUMNS);
    let rows = builder
      .build_query_as::<OrderItem>()
      .fetch_all(&mut **tx)
      .await
      .map_err(|e| map_sqlx_error("insert_order_items", e))?;
    Ok(rows)
  }

  async fn commit(&mut self) -> Result<(), StoreError> {
    let tx = self.tx.take().ok_or(StoreError::Finished)?;
    tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
    debug!("Transaction committed.");
    Ok(())
  }

  async fn rollback(&mut self) -> Result<(), StoreError> {
    let tx = self.tx.take().ok_or(StoreError::Finished)?;
    tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
    debug!("Transaction rolled back.");
    Ok(())
  }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
  if let sqlx::Error::Database(db_err) = &err {
    if db_err.code().as_deref() == Some("23503") {
      return StoreError::ForeignKey {
        operation,
        message: db_err.message().to_string(),
      };
    }
  }
  StoreError::Database { operation, source: err }
}
