//! Capability contracts for the remote collaborators of the order
//! orchestrator: the product directory, the user directory, and the
//! payment gateway.
//!
//! The orchestrator depends only on these traits, never on a transport,
//! so a test double can substitute an in-memory fake. The in-memory
//! implementations here are stateful (real stock arithmetic, not canned
//! responses) and expose failure toggles for exercising communication
//! failures.

pub mod error;
pub mod payment;
pub mod product;
pub mod user;

pub use error::ClientError;
pub use payment::{PaymentGateway, StubPaymentGateway};
pub use product::{InMemoryProductDirectory, ProductDirectory, ProductSnapshot};
pub use user::{InMemoryUserDirectory, UserDirectory, UserSnapshot};
