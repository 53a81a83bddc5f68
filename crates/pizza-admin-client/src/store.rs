//! Entity store abstraction
//!
//! Pages talk to the backend only through [`EntityStore`], so the same view
//! code runs against the HTTP API and the in-memory backend.

use crate::error::ClientResult;
use async_trait::async_trait;
use pizza_admin_core::{Entity, EntityId, EntityKind};

/// Relation names the backend should expand in a response
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Relations(Vec<String>);

impl Relations {
    /// Expand nothing
    #[must_use]
    pub const fn none() -> Self {
        Self(Vec::new())
    }

    /// Expand the given relation names
    #[must_use]
    pub fn of(names: &[&str]) -> Self {
        Self(names.iter().map(ToString::to_string).collect())
    }

    /// Relations expanded by the list page of `E`
    #[must_use]
    pub fn list_of<E: Entity>() -> Self {
        Self::of(E::LIST_RELATIONS)
    }

    /// Relations expanded by the detail page of `E`
    #[must_use]
    pub fn detail_of<E: Entity>() -> Self {
        Self::of(E::DETAIL_RELATIONS)
    }

    /// Whether no relation is requested
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `name` is requested
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|relation| relation == name)
    }

    /// Requested names in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// CRUD access to one entity type
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Fetch the whole collection
    async fn list(&self, relations: &Relations) -> ClientResult<Vec<E>>;

    /// Fetch one record
    async fn get(&self, id: &EntityId, relations: &Relations) -> ClientResult<E>;

    /// Create a record and return it as stored
    async fn create(&self, draft: &E::Draft) -> ClientResult<E>;

    /// Apply the set fields of `draft` and return the stored record
    async fn update(&self, id: &EntityId, draft: &E::Draft) -> ClientResult<E>;

    /// Remove a record
    async fn delete(&self, id: &EntityId) -> ClientResult<()>;
}

/// Deletes records of any entity type
///
/// Detail pages delete child rows whose type differs from the page's own.
#[async_trait]
pub trait ResourceDeleter: Send + Sync {
    /// Remove record `id` of type `kind`
    async fn delete_resource(&self, kind: EntityKind, id: &EntityId) -> ClientResult<()>;
}
