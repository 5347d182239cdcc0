//! Product directory capability and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// A product record as returned by the product directory.
///
/// `price` and `name` are the values the orchestrator snapshots into a
/// line item; `quantity` is the directory's current stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

/// Remote capability to read and mutate product stock.
#[async_trait]
pub trait ProductDirectory: Send + Sync {
    /// Fetches the current product record.
    async fn get_product(&self, id: ProductId) -> Result<ProductSnapshot, ClientError>;

    /// Returns true if at least `quantity` units are available.
    async fn check_stock(&self, id: ProductId, quantity: u32) -> Result<bool, ClientError>;

    /// Consumes `quantity` units of stock. Fails with
    /// [`ClientError::InsufficientStock`] when the floor at zero would be
    /// crossed.
    async fn reduce_inventory(&self, id: ProductId, quantity: u32) -> Result<(), ClientError>;

    /// Returns `quantity` units of stock, compensating an earlier
    /// reduction.
    async fn restore_inventory(&self, id: ProductId, quantity: u32) -> Result<(), ClientError>;
}

#[derive(Debug, Default)]
struct InMemoryProductState {
    products: HashMap<ProductId, ProductSnapshot>,
    unreachable: bool,
}

/// In-memory product directory for wiring and tests.
///
/// Keeps real stock levels so check/reduce/restore behave like the remote
/// service, including the quantity floor at zero.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductDirectory {
    state: Arc<RwLock<InMemoryProductState>>,
}

impl InMemoryProductDirectory {
    /// Creates an empty in-memory product directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product and returns its directory-assigned id.
    pub fn add_product(&self, name: impl Into<String>, price: Money, quantity: u32) -> ProductId {
        let id = ProductId::new();
        self.state.write().unwrap().products.insert(
            id,
            ProductSnapshot {
                id,
                name: name.into(),
                price,
                quantity,
            },
        );
        id
    }

    /// Overwrites a product's price, as a later catalog edit would.
    pub fn set_price(&self, id: ProductId, price: Money) {
        if let Some(product) = self.state.write().unwrap().products.get_mut(&id) {
            product.price = price;
        }
    }

    /// Returns the current stock level, if the product exists.
    pub fn quantity_of(&self, id: ProductId) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .products
            .get(&id)
            .map(|p| p.quantity)
    }

    /// Makes every call fail with a communication error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.write().unwrap().unreachable = unreachable;
    }

    fn ensure_reachable(state: &InMemoryProductState) -> Result<(), ClientError> {
        if state.unreachable {
            return Err(ClientError::Communication(
                "product directory unreachable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductDirectory for InMemoryProductDirectory {
    async fn get_product(&self, id: ProductId) -> Result<ProductSnapshot, ClientError> {
        let state = self.state.read().unwrap();
        Self::ensure_reachable(&state)?;
        state
            .products
            .get(&id)
            .cloned()
            .ok_or(ClientError::NotFound {
                resource: "product",
                id: id.as_uuid(),
            })
    }

    async fn check_stock(&self, id: ProductId, quantity: u32) -> Result<bool, ClientError> {
        let state = self.state.read().unwrap();
        Self::ensure_reachable(&state)?;
        let product = state.products.get(&id).ok_or(ClientError::NotFound {
            resource: "product",
            id: id.as_uuid(),
        })?;
        Ok(product.quantity >= quantity)
    }

    async fn reduce_inventory(&self, id: ProductId, quantity: u32) -> Result<(), ClientError> {
        let mut state = self.state.write().unwrap();
        Self::ensure_reachable(&state)?;
        let product = state.products.get_mut(&id).ok_or(ClientError::NotFound {
            resource: "product",
            id: id.as_uuid(),
        })?;
        if product.quantity < quantity {
            return Err(ClientError::InsufficientStock {
                product_id: id,
                requested: quantity,
                available: product.quantity,
            });
        }
        product.quantity -= quantity;
        Ok(())
    }

    async fn restore_inventory(&self, id: ProductId, quantity: u32) -> Result<(), ClientError> {
        let mut state = self.state.write().unwrap();
        Self::ensure_reachable(&state)?;
        let product = state.products.get_mut(&id).ok_or(ClientError::NotFound {
            resource: "product",
            id: id.as_uuid(),
        })?;
        product.quantity += quantity;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_product_returns_snapshot() {
        let directory = InMemoryProductDirectory::new();
        let id = directory.add_product("Widget", Money::from_cents(1000), 5);

        let product = directory.get_product(id).await.unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price.cents(), 1000);
        assert_eq!(product.quantity, 5);
    }

    #[tokio::test]
    async fn get_missing_product_is_not_found() {
        let directory = InMemoryProductDirectory::new();
        let result = directory.get_product(ProductId::new()).await;
        assert!(matches!(result, Err(ClientError::NotFound { .. })));
    }

    #[tokio::test]
    async fn check_stock_compares_against_quantity() {
        let directory = InMemoryProductDirectory::new();
        let id = directory.add_product("Widget", Money::from_cents(1000), 3);

        assert!(directory.check_stock(id, 3).await.unwrap());
        assert!(!directory.check_stock(id, 4).await.unwrap());
    }

    #[tokio::test]
    async fn reduce_and_restore_mutate_stock() {
        let directory = InMemoryProductDirectory::new();
        let id = directory.add_product("Widget", Money::from_cents(1000), 5);

        directory.reduce_inventory(id, 2).await.unwrap();
        assert_eq!(directory.quantity_of(id), Some(3));

        directory.restore_inventory(id, 2).await.unwrap();
        assert_eq!(directory.quantity_of(id), Some(5));
    }

    #[tokio::test]
    async fn reduce_below_zero_is_rejected() {
        let directory = InMemoryProductDirectory::new();
        let id = directory.add_product("Widget", Money::from_cents(1000), 1);

        let result = directory.reduce_inventory(id, 2).await;
        assert!(matches!(
            result,
            Err(ClientError::InsufficientStock {
                requested: 2,
                available: 1,
                ..
            })
        ));
        // Stock untouched by the failed reduction.
        assert_eq!(directory.quantity_of(id), Some(1));
    }

    #[tokio::test]
    async fn unreachable_directory_fails_with_communication() {
        let directory = InMemoryProductDirectory::new();
        let id = directory.add_product("Widget", Money::from_cents(1000), 1);
        directory.set_unreachable(true);

        let result = directory.get_product(id).await;
        assert!(matches!(result, Err(ClientError::Communication(_))));

        directory.set_unreachable(false);
        assert!(directory.get_product(id).await.is_ok());
    }
}
