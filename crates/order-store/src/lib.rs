//! Order persistence.
//!
//! The [`OrderRepository`] trait is the storage capability the
//! orchestrator consumes: id and timestamp assignment happen here, and an
//! order plus its items is written as one atomic unit. Two
//! implementations are provided: [`InMemoryOrderRepository`] for wiring
//! and tests, and [`PostgresOrderRepository`] backed by sqlx.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use error::{Result, StoreError};
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use repository::OrderRepository;
