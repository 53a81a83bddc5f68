//! View state held by an [`EntityController`](crate::EntityController)

use pizza_admin_client::ClientError;
use pizza_admin_core::{Entity, EntityId};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// What a controller is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewKey {
    /// The whole collection of the entity type
    Collection,
    /// A single record
    Entity(EntityId),
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection => f.write_str("collection"),
            Self::Entity(id) => write!(f, "record {id}"),
        }
    }
}

impl From<EntityId> for ViewKey {
    fn from(id: EntityId) -> Self {
        Self::Entity(id)
    }
}

/// Lifecycle of the current key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch succeeded
    Ready,
    /// The last fetch failed
    Errored,
}

/// Last successful fetch, immutable once stored
#[derive(Debug, PartialEq)]
pub enum Snapshot<E> {
    /// A single record
    Entity(Arc<E>),
    /// A whole collection
    Collection(Arc<[E]>),
}

impl<E> Clone for Snapshot<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Entity(record) => Self::Entity(Arc::clone(record)),
            Self::Collection(records) => Self::Collection(Arc::clone(records)),
        }
    }
}

impl<E: Entity> Snapshot<E> {
    /// The record, for single record keys
    #[must_use]
    pub fn entity(&self) -> Option<&E> {
        match self {
            Self::Entity(record) => Some(record),
            Self::Collection(_) => None,
        }
    }

    /// The records, for collection keys
    #[must_use]
    pub fn collection(&self) -> Option<&[E]> {
        match self {
            Self::Entity(_) => None,
            Self::Collection(records) => Some(records),
        }
    }
}

/// A fetch that failed; suppresses the view content
#[derive(Debug, Clone, Error)]
#[error("failed to load {key}: {source}")]
pub struct FetchError {
    key: ViewKey,
    #[source]
    source: Arc<ClientError>,
}

impl FetchError {
    pub(crate) fn new(key: ViewKey, source: ClientError) -> Self {
        Self {
            key,
            source: Arc::new(source),
        }
    }

    /// Key whose fetch failed
    #[must_use]
    pub const fn key(&self) -> &ViewKey {
        &self.key
    }

    /// Underlying store error
    #[must_use]
    pub fn error(&self) -> &ClientError {
        &self.source
    }
}

/// Mutation kind, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Record creation
    Create,
    /// Record update
    Update,
    /// Record removal
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// A mutation that failed; shown beside the still-valid snapshot
#[derive(Debug, Clone, Error)]
#[error("{kind} failed: {source}")]
pub struct MutationError {
    kind: MutationKind,
    #[source]
    source: Arc<ClientError>,
}

impl MutationError {
    pub(crate) fn new(kind: MutationKind, source: ClientError) -> Self {
        Self {
            kind,
            source: Arc::new(source),
        }
    }

    /// Which mutation failed
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        self.kind
    }

    /// Underlying store error
    #[must_use]
    pub fn error(&self) -> &ClientError {
        &self.source
    }
}

/// Point-in-time copy of a controller's state
#[derive(Debug, Clone)]
pub struct ViewState<E> {
    /// Current key, `None` before the first load
    pub key: Option<ViewKey>,
    /// Lifecycle phase
    pub phase: Phase,
    /// Last successful fetch for `key`
    pub snapshot: Option<Snapshot<E>>,
    /// Failure of the last fetch
    pub fetch_error: Option<FetchError>,
    /// Failure of the last mutation
    pub mutation_error: Option<MutationError>,
}

impl<E> Default for ViewState<E> {
    fn default() -> Self {
        Self {
            key: None,
            phase: Phase::Idle,
            snapshot: None,
            fetch_error: None,
            mutation_error: None,
        }
    }
}

impl<E: Entity> ViewState<E> {
    /// Whether a fetch is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Whether a spinner should replace the content
    ///
    /// True while loading with nothing to show; a revalidation of the same key
    /// keeps the previous snapshot on screen instead.
    #[must_use]
    pub fn shows_spinner(&self) -> bool {
        self.is_loading() && self.snapshot.is_none()
    }

    /// The record, for single record keys
    #[must_use]
    pub fn entity(&self) -> Option<&E> {
        self.snapshot.as_ref().and_then(Snapshot::entity)
    }

    /// The records, for collection keys
    #[must_use]
    pub fn collection(&self) -> Option<&[E]> {
        self.snapshot.as_ref().and_then(Snapshot::collection)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pizza_admin_core::{EntityKind, MenuItem};
    use pretty_assertions::assert_eq;

    fn item(id: &str) -> MenuItem {
        serde_json::from_value(serde_json::json!({"id": id, "name": "Margherita", "price": 9.5}))
            .unwrap()
    }

    fn missing(id: &str) -> ClientError {
        ClientError::NotFound {
            kind: EntityKind::MenuItem,
            id: id.into(),
        }
    }

    #[test]
    fn test_view_key_display() {
        assert_eq!(ViewKey::Collection.to_string(), "collection");
        assert_eq!(
            ViewKey::from(EntityId::from("item-1")).to_string(),
            "record item-1"
        );
    }

    #[test]
    fn test_snapshot_accessors() {
        let single = Snapshot::Entity(Arc::new(item("item-1")));
        assert_eq!(single.entity().map(|m| m.name.as_str()), Some("Margherita"));
        assert!(single.collection().is_none());

        let many: Snapshot<MenuItem> = Snapshot::Collection(vec![item("a"), item("b")].into());
        assert_eq!(many.collection().map(<[MenuItem]>::len), Some(2));
        assert_eq!(many.clone(), many);
    }

    #[test]
    fn test_spinner_only_without_snapshot() {
        let mut state = ViewState::<MenuItem> {
            phase: Phase::Loading,
            ..ViewState::default()
        };
        assert!(state.shows_spinner());

        state.snapshot = Some(Snapshot::Entity(Arc::new(item("item-1"))));
        assert!(state.is_loading());
        assert!(!state.shows_spinner());
    }

    #[test]
    fn test_error_display() {
        let error = MutationError::new(MutationKind::Delete, missing("item-9"));
        assert_eq!(error.kind(), MutationKind::Delete);
        assert_eq!(error.to_string(), "delete failed: menu_item item-9 not found");

        let error = FetchError::new(ViewKey::Entity("item-9".into()), missing("item-9"));
        assert_eq!(
            error.to_string(),
            "failed to load record item-9: menu_item item-9 not found"
        );
        assert_eq!(error.key(), &ViewKey::Entity("item-9".into()));
        assert!(error.error().is_not_found());
    }
}
