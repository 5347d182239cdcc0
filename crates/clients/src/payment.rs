//! Payment gateway capability and stub implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, OrderId};

use crate::error::ClientError;

/// The payment decision signal.
///
/// Payment execution is out of scope: the gateway yields a boolean
/// authorize/decline decision, nothing more. The trait seam exists so the
/// orchestrator can be tested against declines and communication
/// failures.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Requests authorization for `amount` against the given order.
    ///
    /// `Ok(false)` is a decline; `Err` means the gateway could not be
    /// consulted at all.
    async fn authorize(
        &self,
        order_id: OrderId,
        amount: Money,
        method: &str,
    ) -> Result<bool, ClientError>;
}

#[derive(Debug, Default)]
struct StubState {
    decline: bool,
    unreachable: bool,
    authorized: u32,
}

/// Stub gateway that approves every authorization by default.
#[derive(Debug, Clone, Default)]
pub struct StubPaymentGateway {
    state: Arc<RwLock<StubState>>,
}

impl StubPaymentGateway {
    /// Creates a gateway that approves everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent authorizations come back declined.
    pub fn set_decline(&self, decline: bool) {
        self.state.write().unwrap().decline = decline;
    }

    /// Makes subsequent calls fail with a communication error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.write().unwrap().unreachable = unreachable;
    }

    /// Number of successful authorizations issued.
    pub fn authorized_count(&self) -> u32 {
        self.state.read().unwrap().authorized
    }
}

#[async_trait]
impl PaymentGateway for StubPaymentGateway {
    async fn authorize(
        &self,
        order_id: OrderId,
        amount: Money,
        method: &str,
    ) -> Result<bool, ClientError> {
        let mut state = self.state.write().unwrap();
        if state.unreachable {
            return Err(ClientError::Communication(
                "payment gateway unreachable".to_string(),
            ));
        }
        if state.decline {
            tracing::debug!(%order_id, %amount, method, "stub gateway declining");
            return Ok(false);
        }
        state.authorized += 1;
        tracing::debug!(%order_id, %amount, method, "stub gateway approving");
        Ok(true)
    }
}
