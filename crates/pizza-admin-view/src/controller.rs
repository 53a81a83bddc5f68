//! Entity view-sync controller
//!
//! Binds one entity type to local view state: fetch, expose the snapshot,
//! mutate, then revalidate. Every page owns exactly one controller per bound
//! key and never shares it.
//!
//! Each fetch is stamped with a generation number when it starts. Only the
//! fetch holding the latest generation may commit, so a slow response for a
//! key the view has already moved away from is dropped on arrival.

use crate::render::RenderPass;
use crate::state::{FetchError, MutationError, MutationKind, Phase, Snapshot, ViewKey, ViewState};
use pizza_admin_client::{ClientResult, EntityStore, Relations, ResourceDeleter};
use pizza_admin_core::{AccessControl, AccessOperation, AccessScope, Entity, EntityId, EntityKind};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

#[derive(Debug)]
struct Inner<E> {
    state: ViewState<E>,
    generation: u64,
}

/// View-sync controller for entity type `E`
pub struct EntityController<E: Entity> {
    store: Arc<dyn EntityStore<E>>,
    access: Arc<dyn AccessControl>,
    scope: AccessScope,
    relations: Relations,
    inner: Mutex<Inner<E>>,
    revision: watch::Sender<u64>,
}

impl<E: Entity> std::fmt::Debug for EntityController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityController")
            .field("kind", &E::KIND)
            .field("scope", &self.scope)
            .field("relations", &self.relations)
            .field("state", &self.inner.lock().state)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> EntityController<E> {
    /// Create a controller with no relation expansion, asking capabilities at
    /// project scope
    pub fn new(store: Arc<dyn EntityStore<E>>, access: Arc<dyn AccessControl>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            store,
            access,
            scope: AccessScope::Project,
            relations: Relations::none(),
            inner: Mutex::new(Inner {
                state: ViewState::default(),
                generation: 0,
            }),
            revision,
        }
    }

    /// Relations expanded on every fetch
    #[must_use]
    pub fn with_relations(mut self, relations: Relations) -> Self {
        self.relations = relations;
        self
    }

    /// Scope capability questions are asked at
    #[must_use]
    pub const fn with_scope(mut self, scope: AccessScope) -> Self {
        self.scope = scope;
        self
    }

    /// Declared relation list
    #[must_use]
    pub const fn relations(&self) -> &Relations {
        &self.relations
    }

    /// Copy of the current state
    #[must_use]
    pub fn state(&self) -> ViewState<E> {
        self.inner.lock().state.clone()
    }

    /// Current lifecycle phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.lock().state.phase
    }

    /// Current snapshot, if any
    #[must_use]
    pub fn snapshot(&self) -> Option<Snapshot<E>> {
        self.inner.lock().state.snapshot.clone()
    }

    /// Current mutation error, if any
    #[must_use]
    pub fn mutation_error(&self) -> Option<MutationError> {
        self.inner.lock().state.mutation_error.clone()
    }

    /// Receiver bumped on every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Ask the capability predicate directly
    ///
    /// Never cached. Use [`EntityController::render_pass`] when the same
    /// question is asked several times while building one view.
    #[must_use]
    pub fn can_perform(&self, kind: EntityKind, operation: AccessOperation) -> bool {
        self.access.has_access(kind, operation, self.scope)
    }

    /// Start a render pass over the capability predicate
    #[must_use]
    pub fn render_pass(&self) -> RenderPass {
        RenderPass::new(Arc::clone(&self.access), self.scope)
    }

    /// Fetch `key` and commit the result unless a newer fetch started meanwhile
    ///
    /// Returns whether this fetch committed.
    #[instrument(skip(self), fields(kind = %E::KIND))]
    pub async fn load(&self, key: ViewKey) -> bool {
        let generation = self.begin(&key);

        let result = match &key {
            ViewKey::Collection => self
                .store
                .list(&self.relations)
                .await
                .map(|records| Snapshot::Collection(records.into())),
            ViewKey::Entity(id) => self
                .store
                .get(id, &self.relations)
                .await
                .map(|record| Snapshot::Entity(Arc::new(record))),
        };

        self.commit(generation, key, result)
    }

    /// Re-fetch the current key
    ///
    /// Also serves as retry after a failed fetch. Does nothing before the
    /// first load.
    pub async fn revalidate(&self) -> bool {
        let key = self.inner.lock().state.key.clone();
        match key {
            Some(key) => self.load(key).await,
            None => false,
        }
    }

    /// Create a record, then revalidate
    pub async fn create(&self, draft: &E::Draft) -> Option<E> {
        self.mutate(MutationKind::Create, self.store.create(draft)).await
    }

    /// Update record `id`, then revalidate
    pub async fn update(&self, id: &EntityId, draft: &E::Draft) -> Option<E> {
        self.mutate(MutationKind::Update, self.store.update(id, draft))
            .await
    }

    /// Delete record `id`, then revalidate
    pub async fn delete(&self, id: &EntityId) -> bool {
        self.mutate(MutationKind::Delete, self.store.delete(id))
            .await
            .is_some()
    }

    /// Delete a record of another entity type, then revalidate
    ///
    /// Used for child rows shown inside this controller's snapshot.
    pub async fn delete_related(
        &self,
        deleter: &dyn ResourceDeleter,
        kind: EntityKind,
        id: &EntityId,
    ) -> bool {
        self.mutate(MutationKind::Delete, deleter.delete_resource(kind, id))
            .await
            .is_some()
    }

    /// Drop the mutation error without retrying
    pub fn clear_mutation_error(&self) {
        let cleared = self.inner.lock().state.mutation_error.take().is_some();
        if cleared {
            self.notify();
        }
    }

    async fn mutate<T>(
        &self,
        kind: MutationKind,
        call: impl Future<Output = ClientResult<T>>,
    ) -> Option<T> {
        self.clear_mutation_error();
        let key = self.inner.lock().state.key.clone();

        match call.await {
            Ok(value) => {
                debug!(entity = %E::KIND, %kind, "mutation succeeded");
                self.revalidate().await;
                Some(value)
            }
            Err(e) => {
                warn!(entity = %E::KIND, %kind, error = %e, "mutation failed");
                // The error belongs to the view the mutation started from
                let stored = {
                    let mut inner = self.inner.lock();
                    let current = inner.state.key == key;
                    if current {
                        inner.state.mutation_error = Some(MutationError::new(kind, e));
                    }
                    current
                };
                if stored {
                    self.notify();
                } else {
                    debug!(entity = %E::KIND, %kind, "view key changed, dropping mutation error");
                }
                None
            }
        }
    }

    fn begin(&self, key: &ViewKey) -> u64 {
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;

            let state = &mut inner.state;
            if state.key.as_ref() != Some(key) {
                state.key = Some(key.clone());
                state.snapshot = None;
                state.mutation_error = None;
            }
            state.fetch_error = None;
            state.phase = Phase::Loading;
            inner.generation
        };

        debug!(entity = %E::KIND, %key, generation, "fetch started");
        self.notify();
        generation
    }

    fn commit(&self, generation: u64, key: ViewKey, result: ClientResult<Snapshot<E>>) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                debug!(
                    entity = %E::KIND,
                    %key,
                    generation,
                    latest = inner.generation,
                    "discarding superseded fetch"
                );
                return false;
            }

            let state = &mut inner.state;
            match result {
                Ok(snapshot) => {
                    state.snapshot = Some(snapshot);
                    state.phase = Phase::Ready;
                    debug!(entity = %E::KIND, %key, generation, "fetch committed");
                }
                Err(e) => {
                    warn!(entity = %E::KIND, %key, error = %e, "fetch failed");
                    state.snapshot = None;
                    state.fetch_error = Some(FetchError::new(key, e));
                    state.phase = Phase::Errored;
                }
            }
        }

        self.notify();
        true
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use pizza_admin_client::{InMemoryStore, StoreOperation};
    use pizza_admin_core::{MenuItem, MenuItemDraft, StaticPolicy};
    use pretty_assertions::assert_eq;

    fn margherita() -> MenuItem {
        serde_json::from_value(serde_json::json!({
            "id": "item-1", "name": "Margherita", "price": 9.5
        }))
        .unwrap()
    }

    fn controller(store: &Arc<InMemoryStore>) -> EntityController<MenuItem> {
        EntityController::new(store.clone(), Arc::new(StaticPolicy::allow_all()))
    }

    #[tokio::test]
    async fn test_initial_state_is_idle() {
        let store = Arc::new(InMemoryStore::new());
        let controller = controller(&store);

        assert_eq!(controller.phase(), Phase::Idle);
        assert!(controller.snapshot().is_none());
        assert!(!controller.revalidate().await);
        assert_eq!(store.call_count(StoreOperation::List), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_suppresses_snapshot_and_retry_recovers() {
        let store = Arc::new(InMemoryStore::new().with_record(&margherita()).unwrap());
        let controller = controller(&store);
        let key = ViewKey::Entity("item-1".into());

        assert!(controller.load(key.clone()).await);
        store.fail_next(StoreOperation::Get, "backend down");

        assert!(controller.revalidate().await);
        let state = controller.state();
        assert_eq!(state.phase, Phase::Errored);
        assert!(state.snapshot.is_none());
        assert!(state.fetch_error.unwrap().to_string().contains("backend down"));

        assert!(controller.revalidate().await);
        let state = controller.state();
        assert_eq!(state.phase, Phase::Ready);
        assert!(state.fetch_error.is_none());
        assert_eq!(state.entity().unwrap().price, 9.5);
    }

    #[tokio::test]
    async fn test_key_change_drops_snapshot_and_mutation_error() {
        let store = Arc::new(InMemoryStore::new().with_record(&margherita()).unwrap());
        let controller = controller(&store);

        controller.load(ViewKey::Entity("item-1".into())).await;
        store.fail_next(StoreOperation::Update, "rejected");
        assert!(
            controller
                .update(&"item-1".into(), &MenuItemDraft::default())
                .await
                .is_none()
        );
        assert!(controller.mutation_error().is_some());

        controller.load(ViewKey::Collection).await;
        let state = controller.state();
        assert!(state.mutation_error.is_none());
        assert_eq!(state.collection().map(<[MenuItem]>::len), Some(1));
        assert!(state.entity().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_every_transition() {
        let store = Arc::new(InMemoryStore::new().with_record(&margherita()).unwrap());
        let controller = controller(&store);
        let mut receiver = controller.subscribe();

        controller.load(ViewKey::Collection).await;
        assert!(receiver.has_changed().unwrap());
        // begin + commit
        assert_eq!(*receiver.borrow_and_update(), 2);

        controller.clear_mutation_error();
        assert!(!receiver.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_can_perform_reads_the_predicate() {
        let store = Arc::new(InMemoryStore::new());
        let only_reads =
            |_: EntityKind, op: AccessOperation, _: AccessScope| op == AccessOperation::Read;
        let controller: EntityController<MenuItem> =
            EntityController::new(store, Arc::new(only_reads));

        assert!(controller.can_perform(EntityKind::MenuItem, AccessOperation::Read));
        assert!(!controller.can_perform(EntityKind::MenuItem, AccessOperation::Delete));
    }
}
