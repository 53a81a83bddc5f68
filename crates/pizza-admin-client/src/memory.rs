//! In-memory entity backend
//!
//! Behaves like the REST API closely enough to drive pages without a server:
//! ids and timestamps are assigned on create, drafts are merged field by
//! field on update with `null` unsetting a field, and relation expansion is
//! resolved from foreign keys.
//! Failures and per-record latency can be injected for tests.

use crate::error::{ClientError, ClientResult};
use crate::store::{EntityStore, Relations, ResourceDeleter};
use async_trait::async_trait;
use chrono::Utc;
use http::StatusCode;
use parking_lot::{Mutex, RwLock};
use pizza_admin_core::{Entity, EntityId, EntityKind};
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::{debug, warn};

/// Store operation, used to target injected failures and count calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Collection fetch
    List,
    /// Single record fetch
    Get,
    /// Record creation
    Create,
    /// Record update
    Update,
    /// Record removal
    Delete,
}

#[derive(Debug, Default)]
struct Faults {
    pending: HashMap<StoreOperation, VecDeque<String>>,
    get_latency: HashMap<EntityId, Duration>,
    list_latency: Option<Duration>,
    update_latency: Option<Duration>,
}

/// In-memory entity backend
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<EntityKind, Vec<Value>>>,
    faults: Mutex<Faults>,
    calls: Mutex<HashMap<StoreOperation, usize>>,
}

impl InMemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` as is
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized.
    pub fn insert<E: Entity>(&self, record: &E) -> ClientResult<()> {
        let value = serde_json::to_value(record)?;
        let mut tables = self.tables.write();
        let table = tables.entry(E::KIND).or_default();
        table.retain(|existing| record_id(existing) != Some(record.id().as_str()));
        table.push(value);
        Ok(())
    }

    /// Builder form of [`InMemoryStore::insert`]
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized.
    pub fn with_record<E: Entity>(self, record: &E) -> ClientResult<Self> {
        self.insert(record)?;
        Ok(self)
    }

    /// Make the next `operation` fail with `message`
    ///
    /// Failures queue up: calling this twice fails the next two calls.
    pub fn fail_next(&self, operation: StoreOperation, message: impl Into<String>) {
        self.faults
            .lock()
            .pending
            .entry(operation)
            .or_default()
            .push_back(message.into());
    }

    /// Delay every fetch of record `id`
    pub fn set_get_latency(&self, id: impl Into<EntityId>, latency: Duration) {
        self.faults.lock().get_latency.insert(id.into(), latency);
    }

    /// Delay every collection fetch
    pub fn set_list_latency(&self, latency: Duration) {
        self.faults.lock().list_latency = Some(latency);
    }

    /// Delay every update, including ones that then fail
    pub fn set_update_latency(&self, latency: Duration) {
        self.faults.lock().update_latency = Some(latency);
    }

    /// How many times `operation` was invoked
    #[must_use]
    pub fn call_count(&self, operation: StoreOperation) -> usize {
        self.calls.lock().get(&operation).copied().unwrap_or(0)
    }

    /// Number of stored records of `kind`
    #[must_use]
    pub fn len(&self, kind: EntityKind) -> usize {
        self.tables.read().get(&kind).map_or(0, Vec::len)
    }

    /// Whether no record of `kind` is stored
    #[must_use]
    pub fn is_empty(&self, kind: EntityKind) -> bool {
        self.len(kind) == 0
    }

    /// Count the call and pop an injected failure, if one is queued
    fn enter(&self, operation: StoreOperation) -> ClientResult<()> {
        *self.calls.lock().entry(operation).or_insert(0) += 1;

        let injected = self
            .faults
            .lock()
            .pending
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);

        match injected {
            Some(message) => {
                warn!(?operation, %message, "injected store failure");
                Err(ClientError::status(StatusCode::INTERNAL_SERVER_ERROR, message))
            }
            None => Ok(()),
        }
    }

    fn find(&self, kind: EntityKind, id: &EntityId) -> ClientResult<Value> {
        self.tables
            .read()
            .get(&kind)
            .and_then(|table| {
                table
                    .iter()
                    .find(|record| record_id(record) == Some(id.as_str()))
            })
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                kind,
                id: id.clone(),
            })
    }

    /// Attach the requested relations to `record`
    ///
    /// Linked types resolve through the record's own foreign key; every other
    /// relation resolves to the records pointing back at this one.
    fn expand(
        &self,
        kind: EntityKind,
        linked: &[EntityKind],
        mut record: Value,
        relations: &Relations,
    ) -> Value {
        let tables = self.tables.read();
        let Some(object) = record.as_object_mut() else {
            return record;
        };
        let own_id = object.get("id").and_then(Value::as_str).map(ToString::to_string);

        for name in relations.iter() {
            let Some(target) = EntityKind::from_resource_name(name) else {
                warn!(relation = name, "unknown relation requested");
                continue;
            };
            let rows = tables.get(&target).map(Vec::as_slice).unwrap_or_default();

            if linked.contains(&target) {
                let key = object
                    .get(&target.foreign_key())
                    .and_then(Value::as_str)
                    .map(ToString::to_string);
                let related = key.and_then(|key| {
                    rows.iter()
                        .find(|row| record_id(row) == Some(key.as_str()))
                        .cloned()
                });
                if let Some(related) = related {
                    object.insert(name.to_string(), related);
                }
            } else {
                let back_key = kind.foreign_key();
                let children: Vec<Value> = rows
                    .iter()
                    .filter(|row| {
                        row.get(&back_key).and_then(Value::as_str) == own_id.as_deref()
                            && own_id.is_some()
                    })
                    .cloned()
                    .collect();
                object.insert(name.to_string(), Value::Array(children));
            }
        }

        record
    }

    fn decode<E: Entity>(value: Value) -> ClientResult<E> {
        serde_json::from_value(value)
            .map_err(|e| ClientError::status(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn draft_fields<D: serde::Serialize>(draft: &D) -> ClientResult<Map<String, Value>> {
    match serde_json::to_value(draft)? {
        Value::Object(fields) => Ok(fields),
        other => Err(ClientError::status(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("payload must be an object, got {other}"),
        )),
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for InMemoryStore {
    async fn list(&self, relations: &Relations) -> ClientResult<Vec<E>> {
        self.enter(StoreOperation::List)?;
        let latency = self.faults.lock().list_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let rows = self
            .tables
            .read()
            .get(&E::KIND)
            .cloned()
            .unwrap_or_default();

        rows.into_iter()
            .map(|row| Self::decode(self.expand(E::KIND, E::LINKED, row, relations)))
            .collect()
    }

    async fn get(&self, id: &EntityId, relations: &Relations) -> ClientResult<E> {
        self.enter(StoreOperation::Get)?;
        let latency = self.faults.lock().get_latency.get(id).copied();
        if let Some(latency) = latency {
            debug!(%id, ?latency, "delaying fetch");
            tokio::time::sleep(latency).await;
        }

        let row = self.find(E::KIND, id)?;
        Self::decode(self.expand(E::KIND, E::LINKED, row, relations))
    }

    async fn create(&self, draft: &E::Draft) -> ClientResult<E> {
        self.enter(StoreOperation::Create)?;

        let mut fields = draft_fields(draft)?;
        fields.retain(|_, value| !value.is_null());
        let now = Value::String(Utc::now().to_rfc3339());
        fields.insert(
            "id".to_string(),
            Value::String(uuid::Uuid::new_v4().to_string()),
        );
        fields.insert("created_at".to_string(), now.clone());
        fields.insert("updated_at".to_string(), now);

        let value = Value::Object(fields);
        let record: E = Self::decode(value.clone())?;
        self.tables.write().entry(E::KIND).or_default().push(value);
        debug!(kind = %E::KIND, id = %record.id(), "record created");
        Ok(record)
    }

    async fn update(&self, id: &EntityId, draft: &E::Draft) -> ClientResult<E> {
        let latency = self.faults.lock().update_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.enter(StoreOperation::Update)?;

        let changes = draft_fields(draft)?;
        let mut tables = self.tables.write();
        let row = tables
            .get_mut(&E::KIND)
            .and_then(|table| {
                table
                    .iter_mut()
                    .find(|record| record_id(record) == Some(id.as_str()))
            })
            .ok_or_else(|| ClientError::NotFound {
                kind: E::KIND,
                id: id.clone(),
            })?;

        let mut merged = row.clone();
        if let Some(object) = merged.as_object_mut() {
            for (field, value) in changes {
                if value.is_null() {
                    object.remove(&field);
                } else {
                    object.insert(field, value);
                }
            }
            object.insert(
                "updated_at".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }

        let record: E = Self::decode(merged.clone())?;
        *row = merged;
        debug!(kind = %E::KIND, %id, "record updated");
        Ok(record)
    }

    async fn delete(&self, id: &EntityId) -> ClientResult<()> {
        self.delete_resource(E::KIND, id).await
    }
}

#[async_trait]
impl ResourceDeleter for InMemoryStore {
    async fn delete_resource(&self, kind: EntityKind, id: &EntityId) -> ClientResult<()> {
        self.enter(StoreOperation::Delete)?;

        let mut tables = self.tables.write();
        let table = tables.entry(kind).or_default();
        let before = table.len();
        table.retain(|record| record_id(record) != Some(id.as_str()));

        if table.len() == before {
            return Err(ClientError::NotFound {
                kind,
                id: id.clone(),
            });
        }
        debug!(%kind, %id, "record deleted");
        Ok(())
    }
}
