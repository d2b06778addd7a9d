// app/src/models/mod.rs

//! Rows of the relational schema and the values written into them.

pub mod address;
pub mod money;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod place_order;
pub mod product;

pub use address::{Address, NewAddress};
pub use money::Money;
pub use order::{NewOrder, Order, OrderDetails, OrderItemDetails, OrderStatus, PaymentMethod, PaymentStatus, ShippingMethod};
pub use order_item::{NewOrderItem, OrderItem};
pub use payment::Payment;
pub use place_order::{LineItemRequest, OrderLine, PlaceOrderRequest, ValidatedOrder};
pub use product::Product;
