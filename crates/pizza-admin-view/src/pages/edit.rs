//! Edit form page

use super::{FieldView, OptionSource, PageContext, field_views, refresh_sources};
use crate::controller::EntityController;
use crate::error::ViewResult;
use crate::form::FormState;
use crate::state::ViewKey;
use parking_lot::Mutex;
use pizza_admin_client::{EntityStore, Relations};
use pizza_admin_core::{AccessOperation, Entity, EntityId, EntityKind};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rendered edit page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditView {
    /// Entity type edited
    pub kind: EntityKind,
    /// Record edited
    pub id: EntityId,
    /// Spinner instead of the form
    pub loading: bool,
    /// Fetch failure
    pub fetch_error: Option<String>,
    /// Failure of the last submit
    pub form_error: Option<String>,
    /// Form inputs
    pub fields: Vec<FieldView>,
    /// Submit button disabled
    pub submitting: bool,
}

/// Edit page of record `id` of `E`
///
/// The form is reinitialized from every snapshot the controller commits and
/// validated on submit only.
pub struct EditPage<E: Entity> {
    id: EntityId,
    controller: EntityController<E>,
    form: Mutex<FormState<E>>,
    sources: BTreeMap<&'static str, Arc<dyn OptionSource>>,
}

impl<E: Entity> std::fmt::Debug for EditPage<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditPage")
            .field("id", &self.id)
            .field("controller", &self.controller)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<E: Entity> EditPage<E> {
    /// Mount the page
    ///
    /// # Errors
    ///
    /// Returns [`crate::ViewError::Forbidden`] without UPDATE on `E`.
    pub fn mount(
        store: Arc<dyn EntityStore<E>>,
        context: &PageContext,
        id: EntityId,
    ) -> ViewResult<Self> {
        context.authorize(E::KIND, AccessOperation::Update)?;
        Ok(Self {
            id,
            controller: context.controller(store).with_relations(Relations::none()),
            form: Mutex::new(FormState::uninitialized()),
            sources: BTreeMap::new(),
        })
    }

    /// Back reference field `field` with an option list
    #[must_use]
    pub fn with_options(mut self, field: &'static str, source: Arc<dyn OptionSource>) -> Self {
        self.sources.insert(field, source);
        self
    }

    /// The page's controller
    #[must_use]
    pub const fn controller(&self) -> &EntityController<E> {
        &self.controller
    }

    /// Fetch the record and the option lists
    pub async fn load(&self) -> bool {
        let committed = self.controller.load(ViewKey::Entity(self.id.clone())).await;
        self.sync_form();
        refresh_sources(&self.sources).await;
        committed
    }

    /// Change one input
    ///
    /// # Errors
    ///
    /// Returns an error for unknown fields and unparsable numbers.
    pub fn set_field(&self, name: &str, raw: &str) -> ViewResult<()> {
        self.form.lock().set_field(name, raw)?;
        Ok(())
    }

    /// Validate and send the update
    ///
    /// Returns the stored record on success; on failure the form keeps its
    /// values and shows the error.
    pub async fn submit(&self) -> Option<E> {
        let draft = {
            let mut form = self.form.lock();
            let draft = form.validate()?;
            form.set_submitting(true);
            draft
        };

        let updated = self.controller.update(&self.id, &draft).await;

        if updated.is_some() {
            self.sync_form();
            self.form.lock().reset();
        } else {
            self.form.lock().set_submitting(false);
        }
        updated
    }

    /// Build the view from the current state
    #[must_use]
    pub fn render(&self) -> EditView {
        let state = self.controller.state();
        let form = self.form.lock();

        EditView {
            kind: E::KIND,
            id: self.id.clone(),
            loading: state.shows_spinner()
                || (!form.is_initialized() && state.fetch_error.is_none()),
            fetch_error: state.fetch_error.as_ref().map(ToString::to_string),
            form_error: state.mutation_error.as_ref().map(ToString::to_string),
            fields: field_views(&form, &self.sources),
            submitting: form.is_submitting(),
        }
    }

    fn sync_form(&self) {
        let state = self.controller.state();
        if let Some(record) = state.entity() {
            if let Err(e) = self.form.lock().reinitialize(&record.to_draft()) {
                warn!(entity = %E::KIND, error = %e, "form reinitialize failed");
            } else {
                debug!(entity = %E::KIND, id = %self.id, "form reinitialized");
            }
        }
    }
}
