//! Pages binding a controller to a permission-filtered render model
//!
//! Every page is generic over the entity type it shows. Mounting checks the
//! grant the page needs; rendering runs one [`RenderPass`] so every
//! affordance of a view agrees on each capability answer.

mod create;
mod detail;
mod edit;
mod list;

pub use create::{CreatePage, CreateView};
pub use detail::{ChildTable, ChildTableRow, DetailPage, DetailView};
pub use edit::{EditPage, EditView};
pub use list::{ListPage, ListRow, ListView};

use crate::controller::EntityController;
use crate::error::{ViewError, ViewResult};
use crate::form::FormState;
use crate::navigation::{Navigator, Route};
use crate::render::RenderPass;
use crate::state::ViewKey;
use async_trait::async_trait;
use pizza_admin_core::{
    AccessControl, AccessOperation, AccessScope, Entity, EntityId, EntityKind,
};
use pizza_admin_core::types::RelationLink;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Collaborators shared by every page of a session
#[derive(Clone)]
pub struct PageContext {
    /// Capability predicate
    pub access: Arc<dyn AccessControl>,
    /// Scope capability questions are asked at
    pub scope: AccessScope,
    /// Receiver of view transitions
    pub navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl PageContext {
    /// Context asking at project scope
    pub fn new(access: Arc<dyn AccessControl>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            access,
            scope: AccessScope::Project,
            navigator,
        }
    }

    /// Ask at `scope` instead
    #[must_use]
    pub const fn with_scope(mut self, scope: AccessScope) -> Self {
        self.scope = scope;
        self
    }

    /// Refuse to mount a page without `operation` on `kind`
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Forbidden`] when the grant is missing.
    pub fn authorize(&self, kind: EntityKind, operation: AccessOperation) -> ViewResult<()> {
        if self.access.has_access(kind, operation, self.scope) {
            Ok(())
        } else {
            tracing::warn!(%kind, %operation, "page refused");
            Err(ViewError::Forbidden { kind, operation })
        }
    }

    fn controller<E: Entity>(
        &self,
        store: Arc<dyn pizza_admin_client::EntityStore<E>>,
    ) -> EntityController<E> {
        EntityController::new(store, Arc::clone(&self.access)).with_scope(self.scope)
    }
}

/// Table cell, optionally linking to another record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Display text
    pub text: String,
    /// Target when the cell is a link
    pub link: Option<Route>,
}

impl Cell {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
        }
    }

    fn relation(link: &RelationLink) -> Self {
        Self {
            text: link.label.clone().unwrap_or_default(),
            link: link.id.clone().map(|id| Route::View(link.kind, id)),
        }
    }
}

/// Choice offered by a reference field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Referenced record id
    pub id: EntityId,
    /// Option text
    pub label: String,
}

/// Option list behind a reference field
#[async_trait]
pub trait OptionSource: Send + Sync {
    /// Fetch the options; returns whether the fetch committed
    async fn refresh(&self) -> bool;

    /// Options from the last successful fetch
    fn options(&self) -> Vec<SelectOption>;

    /// Whether the options are still loading
    fn is_loading(&self) -> bool;
}

#[async_trait]
impl<R: Entity> OptionSource for EntityController<R> {
    async fn refresh(&self) -> bool {
        self.load(ViewKey::Collection).await
    }

    fn options(&self) -> Vec<SelectOption> {
        self.state()
            .collection()
            .unwrap_or_default()
            .iter()
            .map(|record| SelectOption {
                id: record.id().clone(),
                label: record.label(),
            })
            .collect()
    }

    fn is_loading(&self) -> bool {
        self.state().is_loading()
    }
}

/// One input of a rendered form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    /// Draft field name
    pub name: &'static str,
    /// Input label
    pub label: &'static str,
    /// Current value as text
    pub value: String,
    /// Validation error
    pub error: Option<String>,
    /// Choices, for reference fields backed by an option source
    pub options: Option<Vec<SelectOption>>,
}

fn field_views<E: Entity>(
    form: &FormState<E>,
    sources: &BTreeMap<&'static str, Arc<dyn OptionSource>>,
) -> Vec<FieldView> {
    E::FORM_FIELDS
        .iter()
        .map(|field| FieldView {
            name: field.name,
            label: field.label,
            value: form.value(field.name),
            error: form.error(field.name).map(ToString::to_string),
            options: sources.get(field.name).map(|source| source.options()),
        })
        .collect()
}

async fn refresh_sources(sources: &BTreeMap<&'static str, Arc<dyn OptionSource>>) {
    for source in sources.values() {
        source.refresh().await;
    }
}

/// Relation cells of `record` the viewer may follow
fn relation_cells<E: Entity>(record: &E, pass: &RenderPass) -> Vec<Cell> {
    E::LINKED
        .iter()
        .filter(|kind| pass.can_read(**kind))
        .filter_map(|kind| record.linked(*kind))
        .map(|link| Cell::relation(&link))
        .collect()
}
