//! Collection page

use super::{Cell, PageContext, relation_cells};
use crate::controller::EntityController;
use crate::error::ViewResult;
use crate::navigation::Route;
use crate::state::ViewKey;
use pizza_admin_client::{EntityStore, Relations};
use pizza_admin_core::{AccessOperation, Entity, EntityId, EntityKind};
use std::sync::Arc;

/// Rendered collection page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// Entity type shown
    pub kind: EntityKind,
    /// Create affordance
    pub create: Option<Route>,
    /// Spinner instead of the table
    pub loading: bool,
    /// Fetch failure; the table is empty when set
    pub fetch_error: Option<String>,
    /// Failure of the last delete
    pub delete_error: Option<String>,
    /// Field columns followed by the visible relation columns
    pub columns: Vec<String>,
    /// Table rows
    pub rows: Vec<ListRow>,
}

/// One row of the collection table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    /// Record id
    pub id: EntityId,
    /// Cells in column order
    pub cells: Vec<Cell>,
    /// Edit affordance
    pub edit: Option<Route>,
    /// Delete affordance; only offered alongside edit
    pub can_delete: bool,
}

/// Collection page of `E`
#[derive(Debug)]
pub struct ListPage<E: Entity> {
    context: PageContext,
    controller: EntityController<E>,
}

impl<E: Entity> ListPage<E> {
    /// Mount the page
    ///
    /// # Errors
    ///
    /// Returns [`crate::ViewError::Forbidden`] without READ on `E`.
    pub fn mount(store: Arc<dyn EntityStore<E>>, context: PageContext) -> ViewResult<Self> {
        context.authorize(E::KIND, AccessOperation::Read)?;
        let controller = context
            .controller(store)
            .with_relations(Relations::list_of::<E>());
        Ok(Self {
            context,
            controller,
        })
    }

    /// Fetch the collection
    pub async fn load(&self) -> bool {
        self.controller.load(ViewKey::Collection).await
    }

    /// The page's controller
    #[must_use]
    pub const fn controller(&self) -> &EntityController<E> {
        &self.controller
    }

    /// Row click: open the record when the viewer may read it
    pub fn open(&self, id: &EntityId) -> bool {
        let allowed = self
            .controller
            .can_perform(E::KIND, AccessOperation::Read);
        if allowed {
            self.context.navigator.navigate(Route::View(E::KIND, id.clone()));
        }
        allowed
    }

    /// Delete a row and refresh the collection
    pub async fn delete(&self, id: &EntityId) -> bool {
        self.controller.delete(id).await
    }

    /// Build the view from the current state
    #[must_use]
    pub fn render(&self) -> ListView {
        let pass = self.controller.render_pass();
        let state = self.controller.state();

        let can_update = pass.can(E::KIND, AccessOperation::Update);
        let can_delete = can_update && pass.can(E::KIND, AccessOperation::Delete);

        let columns = E::COLUMNS
            .iter()
            .map(ToString::to_string)
            .chain(
                E::LINKED
                    .iter()
                    .filter(|kind| pass.can_read(**kind))
                    .map(|kind| kind.resource_name().to_string()),
            )
            .collect();

        let rows = state
            .collection()
            .unwrap_or_default()
            .iter()
            .map(|record| {
                let mut cells: Vec<Cell> = E::COLUMNS
                    .iter()
                    .map(|column| Cell::text(record.cell(column).unwrap_or_default()))
                    .collect();
                cells.extend(relation_cells(record, &pass));
                ListRow {
                    id: record.id().clone(),
                    cells,
                    edit: can_update.then(|| Route::Edit(E::KIND, record.id().clone())),
                    can_delete,
                }
            })
            .collect();

        ListView {
            kind: E::KIND,
            create: pass
                .can(E::KIND, AccessOperation::Create)
                .then(|| Route::create(E::KIND)),
            loading: state.shows_spinner(),
            fetch_error: state.fetch_error.as_ref().map(ToString::to_string),
            delete_error: state.mutation_error.as_ref().map(ToString::to_string),
            columns,
            rows,
        }
    }
}
