//! Create form page

use super::{FieldView, OptionSource, PageContext, field_views, refresh_sources};
use crate::controller::EntityController;
use crate::error::ViewResult;
use crate::form::FormState;
use crate::navigation::Route;
use parking_lot::Mutex;
use pizza_admin_client::EntityStore;
use pizza_admin_core::{AccessOperation, Entity, EntityId, EntityKind};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Rendered create page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateView {
    /// Entity type created
    pub kind: EntityKind,
    /// Failure of the last submit
    pub form_error: Option<String>,
    /// Form inputs
    pub fields: Vec<FieldView>,
    /// Submit button disabled
    pub submitting: bool,
}

/// Create page of `E`
pub struct CreatePage<E: Entity> {
    context: PageContext,
    controller: EntityController<E>,
    form: Mutex<FormState<E>>,
    sources: BTreeMap<&'static str, Arc<dyn OptionSource>>,
}

impl<E: Entity> std::fmt::Debug for CreatePage<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatePage")
            .field("controller", &self.controller)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<E: Entity> CreatePage<E> {
    /// Mount the page, filling in `prefill` when it names a form field
    ///
    /// # Errors
    ///
    /// Returns [`crate::ViewError::Forbidden`] without CREATE on `E`.
    pub fn mount(
        store: Arc<dyn EntityStore<E>>,
        context: PageContext,
        prefill: Option<(String, EntityId)>,
    ) -> ViewResult<Self> {
        context.authorize(E::KIND, AccessOperation::Create)?;

        let mut form = FormState::new();
        if let Some((field, id)) = prefill {
            if FormState::<E>::field(&field).is_some() {
                form.set_value(&field, Value::String(id.to_string()));
            } else {
                tracing::warn!(entity = %E::KIND, %field, "ignoring prefill for unknown field");
            }
        }

        Ok(Self {
            controller: context.controller(store),
            context,
            form: Mutex::new(form),
            sources: BTreeMap::new(),
        })
    }

    /// Mount the page a [`Route::Create`] points at
    ///
    /// # Errors
    ///
    /// Returns [`crate::ViewError::Forbidden`] without CREATE on `E`.
    pub fn mount_route(
        store: Arc<dyn EntityStore<E>>,
        context: PageContext,
        route: &Route,
    ) -> ViewResult<Self> {
        let prefill = match route {
            Route::Create { kind, prefill } if *kind == E::KIND => prefill.clone(),
            _ => None,
        };
        Self::mount(store, context, prefill)
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

    /// Fetch the option lists
    pub async fn load(&self) {
        refresh_sources(&self.sources).await;
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

    /// Validate and create the record, then go to the collection page
    pub async fn submit(&self) -> Option<E> {
        let draft = {
            let mut form = self.form.lock();
            let draft = form.validate()?;
            form.set_submitting(true);
            draft
        };

        let created = self.controller.create(&draft).await;
        self.form.lock().set_submitting(false);

        if created.is_some() {
            self.context.navigator.navigate(Route::List(E::KIND));
        }
        created
    }

    /// Build the view from the current state
    #[must_use]
    pub fn render(&self) -> CreateView {
        let form = self.form.lock();
        CreateView {
            kind: E::KIND,
            form_error: self.controller.mutation_error().map(|e| e.to_string()),
            fields: field_views(&form, &self.sources),
            submitting: form.is_submitting(),
        }
    }
}
