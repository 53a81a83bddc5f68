//! Single record page with related records and child tables

use super::{Cell, PageContext, relation_cells};
use crate::controller::EntityController;
use crate::error::ViewResult;
use crate::navigation::Route;
use crate::render::RenderPass;
use crate::state::ViewKey;
use pizza_admin_client::{EntityStore, Relations, ResourceDeleter};
use pizza_admin_core::types::ChildCollection;
use pizza_admin_core::{AccessOperation, Entity, EntityId, EntityKind};
use std::sync::Arc;

/// Rendered detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    /// Entity type shown
    pub kind: EntityKind,
    /// Spinner instead of the content
    pub loading: bool,
    /// Fetch failure; nothing else is shown when set
    pub fetch_error: Option<String>,
    /// Failure of the last child delete
    pub delete_error: Option<String>,
    /// Edit affordance
    pub edit: Option<Route>,
    /// Label/value pairs
    pub fields: Vec<(String, String)>,
    /// Linked records the viewer may read
    pub relations: Vec<(EntityKind, Cell)>,
    /// Child tables the viewer may read
    pub children: Vec<ChildTable>,
}

/// Records of another type owned by the shown record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildTable {
    /// Child entity type
    pub kind: EntityKind,
    /// Column names
    pub columns: Vec<String>,
    /// Create affordance, prefilled with the parent's foreign key
    pub create: Option<Route>,
    /// Table rows
    pub rows: Vec<ChildTableRow>,
}

/// One child record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildTableRow {
    /// Child record id
    pub id: EntityId,
    /// Cell values in column order
    pub cells: Vec<String>,
    /// Edit affordance
    pub edit: Option<Route>,
    /// Delete affordance
    pub can_delete: bool,
}

impl ChildTable {
    /// Table of `child` rows under record `parent_id`
    ///
    /// READ on the child type only shows the table. Row edit needs UPDATE and
    /// row delete needs DELETE on the child type, so a read-only viewer gets
    /// no row actions; create needs CREATE.
    fn build(parent: EntityKind, parent_id: &EntityId, child: ChildCollection, pass: &RenderPass) -> Self {
        let can_update = pass.can(child.kind, AccessOperation::Update);
        let can_delete = pass.can(child.kind, AccessOperation::Delete);
        let kind = child.kind;

        Self {
            kind,
            columns: child.columns.iter().map(ToString::to_string).collect(),
            create: pass
                .can(kind, AccessOperation::Create)
                .then(|| Route::create_child(kind, parent, parent_id.clone())),
            rows: child
                .rows
                .into_iter()
                .map(|row| ChildTableRow {
                    edit: can_update.then(|| Route::Edit(kind, row.id.clone())),
                    id: row.id,
                    cells: row.cells,
                    can_delete,
                })
                .collect(),
        }
    }
}

/// Detail page of `E`
pub struct DetailPage<E: Entity> {
    context: PageContext,
    controller: EntityController<E>,
    deleter: Arc<dyn ResourceDeleter>,
}

impl<E: Entity> std::fmt::Debug for DetailPage<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailPage")
            .field("context", &self.context)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> DetailPage<E> {
    /// Mount the page
    ///
    /// # Errors
    ///
    /// Returns [`crate::ViewError::Forbidden`] without READ on `E`.
    pub fn mount(
        store: Arc<dyn EntityStore<E>>,
        deleter: Arc<dyn ResourceDeleter>,
        context: PageContext,
    ) -> ViewResult<Self> {
        context.authorize(E::KIND, AccessOperation::Read)?;
        let controller = context
            .controller(store)
            .with_relations(Relations::detail_of::<E>());
        Ok(Self {
            context,
            controller,
            deleter,
        })
    }

    /// Fetch record `id`
    pub async fn load(&self, id: &EntityId) -> bool {
        self.controller.load(ViewKey::Entity(id.clone())).await
    }

    /// The page's controller
    #[must_use]
    pub const fn controller(&self) -> &EntityController<E> {
        &self.controller
    }

    /// Child row click
    pub fn open_child(&self, kind: EntityKind, id: &EntityId) {
        self.context.navigator.navigate(Route::View(kind, id.clone()));
    }

    /// Delete a child record and refresh this one
    pub async fn delete_child(&self, kind: EntityKind, id: &EntityId) -> bool {
        self.controller
            .delete_related(self.deleter.as_ref(), kind, id)
            .await
    }

    /// Build the view from the current state
    #[must_use]
    pub fn render(&self) -> DetailView {
        let pass = self.controller.render_pass();
        let state = self.controller.state();
        let fetch_error = state.fetch_error.as_ref().map(ToString::to_string);
        let delete_error = state.mutation_error.as_ref().map(ToString::to_string);

        let Some(record) = state.entity() else {
            return DetailView {
                kind: E::KIND,
                loading: state.shows_spinner(),
                fetch_error,
                delete_error,
                edit: None,
                fields: Vec::new(),
                relations: Vec::new(),
                children: Vec::new(),
            };
        };

        let relations = E::LINKED
            .iter()
            .copied()
            .filter(|kind| pass.can_read(*kind))
            .zip(relation_cells(record, &pass))
            .collect();

        let children = record
            .children()
            .into_iter()
            .filter(|child| pass.can_read(child.kind))
            .map(|child| ChildTable::build(E::KIND, record.id(), child, &pass))
            .collect();

        DetailView {
            kind: E::KIND,
            loading: false,
            fetch_error,
            delete_error,
            edit: pass
                .can(E::KIND, AccessOperation::Update)
                .then(|| Route::Edit(E::KIND, record.id().clone())),
            fields: record
                .detail_fields()
                .into_iter()
                .map(|(label, value)| (label.to_string(), value))
                .collect(),
            relations,
            children,
        }
    }
}
