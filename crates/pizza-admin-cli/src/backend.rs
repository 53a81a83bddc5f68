//! Store selection for the command line tool

use anyhow::Context;
use pizza_admin_client::{ApiClient, EntityStore, InMemoryStore, ResourceDeleter};
use pizza_admin_core::config::ApiConfig;
use pizza_admin_core::{Entity, MenuItem, Order, OrderItem, PizzaRestaurant, User};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Backend every page of one invocation talks to
#[derive(Debug, Clone)]
pub enum Backend {
    /// Remote REST API
    Http(Arc<ApiClient>),
    /// Process-local store seeded with demo data
    Memory(Arc<InMemoryStore>),
}

impl Backend {
    /// Client for the configured API
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn http(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = ApiClient::from_config(config)
            .with_context(|| format!("cannot use API at {}", config.base_url))?;
        info!(base_url = %client.base_url(), "using remote API");
        Ok(Self::Http(Arc::new(client)))
    }

    /// In-memory store holding the demo records
    ///
    /// # Errors
    ///
    /// Returns an error if a demo record cannot be stored.
    pub fn demo() -> anyhow::Result<Self> {
        let store = seed_demo(InMemoryStore::new())?;
        info!("using in-memory demo data");
        Ok(Self::Memory(Arc::new(store)))
    }

    /// Store for entity type `E`
    #[must_use]
    pub fn store<E: Entity>(&self) -> Arc<dyn EntityStore<E>> {
        match self {
            Self::Http(client) => Arc::clone(client) as Arc<dyn EntityStore<E>>,
            Self::Memory(store) => Arc::clone(store) as Arc<dyn EntityStore<E>>,
        }
    }

    /// Deleter for records of any type
    #[must_use]
    pub fn deleter(&self) -> Arc<dyn ResourceDeleter> {
        match self {
            Self::Http(client) => Arc::clone(client) as Arc<dyn ResourceDeleter>,
            Self::Memory(store) => Arc::clone(store) as Arc<dyn ResourceDeleter>,
        }
    }
}

fn record<E: Entity>(value: serde_json::Value) -> anyhow::Result<E> {
    Ok(serde_json::from_value(value)?)
}

/// Store one small restaurant with a menu, an order and its lines
///
/// # Errors
///
/// Returns an error if a demo record cannot be stored.
pub fn seed_demo(store: InMemoryStore) -> anyhow::Result<InMemoryStore> {
    let store = store
        .with_record(&record::<User>(json!({
            "id": "user-1",
            "email": "owner@luigis.example",
            "firstName": "Luigi",
            "lastName": "Rossi",
            "tenant_id": "tenant-1"
        }))?)?
        .with_record(&record::<User>(json!({
            "id": "user-2",
            "email": "ada@example.com",
            "firstName": "Ada"
        }))?)?
        .with_record(&record::<PizzaRestaurant>(json!({
            "id": "restaurant-1",
            "name": "Luigi's",
            "description": "Wood fired since 1987",
            "tenant_id": "tenant-1",
            "user_id": "user-1"
        }))?)?
        .with_record(&record::<MenuItem>(json!({
            "id": "item-1",
            "name": "Margherita",
            "price": 9.5,
            "pizza_restaurant_id": "restaurant-1"
        }))?)?
        .with_record(&record::<MenuItem>(json!({
            "id": "item-2",
            "name": "Diavola",
            "price": 11.0,
            "pizza_restaurant_id": "restaurant-1"
        }))?)?
        .with_record(&record::<Order>(json!({
            "id": "order-1",
            "status": "pending",
            "user_id": "user-2",
            "pizza_restaurant_id": "restaurant-1"
        }))?)?
        .with_record(&record::<OrderItem>(json!({
            "id": "order-item-1",
            "quantity": 2,
            "menu_item_id": "item-1",
            "order_id": "order-1"
        }))?)?
        .with_record(&record::<OrderItem>(json!({
            "id": "order-item-2",
            "quantity": 1,
            "menu_item_id": "item-2",
            "order_id": "order-1"
        }))?)?;
    Ok(store)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pizza_admin_core::EntityKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_demo_data_covers_every_entity() {
        let store = seed_demo(InMemoryStore::new()).unwrap();
        for kind in EntityKind::ALL {
            assert!(!store.is_empty(kind), "{kind} has no demo records");
        }
        assert_eq!(store.len(EntityKind::OrderItem), 2);
    }

    #[test]
    fn test_http_backend_rejects_bad_url() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        };
        assert!(Backend::http(&config).is_err());
    }
}
