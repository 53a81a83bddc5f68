//! Entity store access for pizza-admin
//!
//! [`EntityStore`] is the CRUD seam every page talks through. Two backends
//! implement it: [`ApiClient`] for the REST API and [`InMemoryStore`] for
//! offline use and tests.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api;
pub mod error;
pub mod memory;
pub mod store;

pub use api::{API_KEY_HEADER, ApiClient};
pub use error::{ClientError, ClientResult};
pub use memory::{InMemoryStore, StoreOperation};
pub use store::{EntityStore, Relations, ResourceDeleter};
