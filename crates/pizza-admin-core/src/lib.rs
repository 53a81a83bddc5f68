//! Core types and utilities for pizza-admin
//!
//! Entity records, the capability model and configuration shared by the API
//! client, the view layer and the command line tool.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod access;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use access::{AccessControl, AccessOperation, AccessScope, Grant, StaticPolicy};
pub use config::Config;
pub use error::{Error, Result};
pub use types::{
    Entity, EntityId, EntityKind, MenuItem, MenuItemDraft, Order, OrderDraft, OrderItem,
    OrderItemDraft, PizzaRestaurant, PizzaRestaurantDraft, User, UserDraft,
};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr so command output on stdout stays clean.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let result = if config.format == "json" {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        subscriber
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| Error::Logging {
        message: e.to_string(),
    })
}
