//! Order domain model.
//!
//! Pure data and logic: the [`Order`] / [`OrderItem`] entities, their
//! unsaved draft counterparts, and the [`OrderStatus`] state machine.
//! Nothing in this crate performs I/O; remote directories and storage
//! live behind the capability traits in the `clients` and `order-store`
//! crates.

pub mod order;
pub mod status;

pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use status::OrderStatus;
