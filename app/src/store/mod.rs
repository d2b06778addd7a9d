// app/src/store/mod.rs

//! The relational store the order workflow talks to.
//!
//! [`OrderStore`] hands out [`OrderUnitOfWork`]s. Everything written through a
//! unit of work becomes visible on [`OrderUnitOfWork::commit`] and is discarded
//! on [`OrderUnitOfWork::rollback`] or when the unit of work is dropped.
//!
//! | Implementation | Isolation |
//! |----------------|-----------|
//! | [`PgOrderStore`] | PostgreSQL transaction; products are row-locked (`FOR UPDATE`) and decremented with a guarded update. |
//! | [`InMemoryOrderStore`] | One unit of work at a time holds an owned lock over all tables. |

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryOrderStore, RowCounts};
pub use postgres::PgOrderStore;

use crate::models::{Address, NewAddress, NewOrder, NewOrderItem, Order, OrderDetails, OrderItem, Product};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("foreign key violation in {operation}: {message}")]
  ForeignKey { operation: &'static str, message: String },

  #[error("{table} row {id} does not exist")]
  MissingRow { table: &'static str, id: Uuid },

  #[error("unit of work was already committed or rolled back")]
  Finished,

  #[error("database error in {operation}: {source}")]
  Database {
    operation: &'static str,
    #[source]
    source: sqlx::Error,
  },

  #[error("store unavailable: {0}")]
  Unavailable(String),
}

/// Outcome of a guarded stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockUpdate {
  Applied { remaining: i32 },
  /// Nothing was written; `available` is the stock seen by the store.
  Insufficient { available: i32 },
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn begin(&self) -> Result<Box<dyn OrderUnitOfWork>, StoreError>;

  /// Reads an order with its address, items (with products) and payments.
  async fn find_order_details(&self, order_id: Uuid) -> Result<Option<OrderDetails>, StoreError>;
}

#[async_trait]
pub trait OrderUnitOfWork: Send {
  async fn insert_address(&mut self, address: &NewAddress) -> Result<Address, StoreError>;

  /// Loads the products that exist among `ids` and locks them until the unit
  /// of work ends. Unknown ids are simply absent from the result.
  async fn find_products(&mut self, ids: &[Uuid]) -> Result<Vec<Product>, StoreError>;

  /// Subtracts `quantity` unless that would take stock below zero.
  async fn decrement_stock(&mut self, product_id: Uuid, quantity: i32) -> Result<StockUpdate, StoreError>;

  async fn insert_order(&mut self, order: &NewOrder) -> Result<Order, StoreError>;

  async fn insert_order_items(&mut self, items: &[NewOrderItem]) -> Result<Vec<OrderItem>, StoreError>;

  async fn commit(&mut self) -> Result<(), StoreError>;

  async fn rollback(&mut self) -> Result<(), StoreError>;
}
