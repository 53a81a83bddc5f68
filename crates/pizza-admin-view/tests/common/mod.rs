//! Shared fixtures for view integration tests

#![allow(dead_code, clippy::unwrap_used)]

use pizza_admin_client::InMemoryStore;
use pizza_admin_core::{MenuItem, Order, OrderItem, PizzaRestaurant, User};
use serde_json::json;
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

pub fn margherita() -> MenuItem {
    serde_json::from_value(json!({
        "id": "item-1",
        "name": "Margherita",
        "price": 9.5,
        "pizza_restaurant_id": "r1"
    }))
    .unwrap()
}

pub fn diavola() -> MenuItem {
    serde_json::from_value(json!({
        "id": "item-2",
        "name": "Diavola",
        "price": 11.0,
        "pizza_restaurant_id": "r1"
    }))
    .unwrap()
}

pub fn luigis() -> PizzaRestaurant {
    serde_json::from_value(json!({
        "id": "r1",
        "name": "Luigi's",
        "user_id": "u1"
    }))
    .unwrap()
}

pub fn ada() -> User {
    serde_json::from_value(json!({
        "id": "u1",
        "email": "ada@example.com",
        "firstName": "Ada"
    }))
    .unwrap()
}

pub fn order() -> Order {
    serde_json::from_value(json!({
        "id": "order-1",
        "status": "pending",
        "user_id": "u1",
        "pizza_restaurant_id": "r1"
    }))
    .unwrap()
}

pub fn order_item(id: &str, menu_item: &str, quantity: i64) -> OrderItem {
    serde_json::from_value(json!({
        "id": id,
        "quantity": quantity,
        "menu_item_id": menu_item,
        "order_id": "order-1"
    }))
    .unwrap()
}

/// Store holding one restaurant, its owner, two menu items and an order
/// with two lines of Margherita
pub fn seeded_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new()
        .with_record(&ada())
        .unwrap()
        .with_record(&luigis())
        .unwrap()
        .with_record(&margherita())
        .unwrap()
        .with_record(&diavola())
        .unwrap()
        .with_record(&order())
        .unwrap()
        .with_record(&order_item("oi-1", "item-1", 2))
        .unwrap()
        .with_record(&order_item("oi-2", "item-1", 1))
        .unwrap();
    Arc::new(store)
}
