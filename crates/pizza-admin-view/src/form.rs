//! Form state over an entity draft

use pizza_admin_core::types::FormField;
use pizza_admin_core::{Entity, Error};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use validator::Validate;

/// Values, initial values and validation errors of a create or edit form
///
/// Values are held per field as JSON and turned into `E::Draft` on
/// validation and submit. Validation runs on submit only.
#[derive(Debug, Clone)]
pub struct FormState<E: Entity> {
    initial: Map<String, Value>,
    values: Map<String, Value>,
    errors: BTreeMap<String, String>,
    submitting: bool,
    initialized: bool,
    entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for FormState<E> {
    fn default() -> Self {
        Self {
            initial: Map::new(),
            values: Map::new(),
            errors: BTreeMap::new(),
            submitting: false,
            initialized: false,
            entity: PhantomData,
        }
    }
}

impl<E: Entity> FormState<E> {
    /// Empty form, e.g. for a create page
    #[must_use]
    pub fn new() -> Self {
        Self {
            initialized: true,
            ..Self::default()
        }
    }

    /// Form whose values wait for the first [`FormState::reinitialize`]
    #[must_use]
    pub fn uninitialized() -> Self {
        Self::default()
    }

    /// Replace initial values and values with `draft`, clearing errors
    ///
    /// # Errors
    ///
    /// Returns an error if the draft does not serialize to an object.
    pub fn reinitialize(&mut self, draft: &E::Draft) -> Result<(), Error> {
        let fields = match serde_json::to_value(draft)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        self.initial = fields.clone();
        self.values = fields;
        self.errors.clear();
        self.initialized = true;
        Ok(())
    }

    /// Go back to the initial values
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
        self.submitting = false;
    }

    /// Whether values have been provided
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Declared field called `name`
    #[must_use]
    pub fn field(name: &str) -> Option<&'static FormField> {
        E::FORM_FIELDS.iter().find(|field| field.name == name)
    }

    /// Parse `raw` according to the field's kind and store it
    ///
    /// Empty input clears the field.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown fields and unparsable numbers; the stored
    /// value is left unchanged.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), Error> {
        let field = Self::field(name).ok_or_else(|| {
            Error::invalid_field(name, format!("{} has no such field", E::KIND))
        })?;
        let value = field.kind.parse(name, raw)?;
        self.set_value(name, value);
        Ok(())
    }

    /// Store an already typed value
    ///
    /// `Null` is kept so the submitted draft clears the field.
    pub fn set_value(&mut self, name: &str, value: Value) {
        self.errors.remove(name);
        self.values.insert(name.to_string(), value);
    }

    /// Current value of `name` as display text
    #[must_use]
    pub fn value(&self, name: &str) -> String {
        match self.values.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Whether values differ from the initial values
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }

    /// Validation errors by field
    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Validation error of `name`
    #[must_use]
    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// Current values as a draft
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not fit the draft's field type.
    pub fn draft(&self) -> Result<E::Draft, Error> {
        Ok(serde_json::from_value(Value::Object(self.values.clone()))?)
    }

    /// Run the draft's validation rules and store the outcome
    ///
    /// Returns the draft when it is valid.
    pub fn validate(&mut self) -> Option<E::Draft> {
        self.errors.clear();

        let draft = match self.draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.errors.insert("_form".to_string(), e.to_string());
                return None;
            }
        };

        match draft.validate() {
            Ok(()) => Some(draft),
            Err(errors) => {
                for (field, field_errors) in errors.field_errors() {
                    let message = field_errors
                        .iter()
                        .map(|error| {
                            error
                                .message
                                .as_ref()
                                .map_or_else(|| error.code.to_string(), ToString::to_string)
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    self.errors.insert(field.to_string(), message);
                }
                tracing::debug!(entity = %E::KIND, errors = ?self.errors, "form rejected");
                None
            }
        }
    }

    /// Whether a submit is in flight
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Mark a submit as started or finished
    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use pizza_admin_core::{EntityId, MenuItem, MenuItemDraft, OrderItem, User};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_field_parses_by_kind() {
        let mut form = FormState::<MenuItem>::new();
        form.set_field("name", "Diavola").unwrap();
        form.set_field("price", "12.5").unwrap();
        form.set_field("pizza_restaurant_id", "r1").unwrap();

        let draft = form.draft().unwrap();
        assert_eq!(
            draft,
            MenuItemDraft {
                name: Some("Diavola".to_string()),
                price: Some(12.5),
                pizza_restaurant_id: Some(Some(EntityId::from("r1"))),
            }
        );
        assert_eq!(form.value("price"), "12.5");
    }

    #[test]
    fn test_set_field_rejects_unknown_and_bad_values() {
        let mut form = FormState::<OrderItem>::new();
        form.set_field("quantity", "2").unwrap();

        assert!(form.set_field("price", "1").is_err());
        assert!(form.set_field("quantity", "two").is_err());
        assert_eq!(form.value("quantity"), "2");
    }

    #[test]
    fn test_validate_reports_field_errors() {
        let mut form = FormState::<MenuItem>::new();
        form.set_field("name", "Marinara").unwrap();

        assert!(form.validate().is_none());
        assert!(form.error("price").is_some());
        assert!(form.error("name").is_none());

        form.set_field("price", "8").unwrap();
        assert!(form.error("price").is_none());
        let draft = form.validate().unwrap();
        assert_eq!(draft.price, Some(8.0));
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_renamed_fields_round_trip() {
        let mut form = FormState::<User>::new();
        form.set_field("email", "ada@example.com").unwrap();
        form.set_field("firstName", "Ada").unwrap();

        let draft = form.validate().unwrap();
        assert_eq!(draft.first_name, Some(Some("Ada".to_string())));
    }

    #[test]
    fn test_emptied_field_submits_as_cleared() {
        let mut form = FormState::<MenuItem>::uninitialized();
        form.reinitialize(&MenuItemDraft {
            name: Some("Margherita".to_string()),
            price: Some(9.5),
            pizza_restaurant_id: Some(Some(EntityId::from("r1"))),
        })
        .unwrap();

        form.set_field("pizza_restaurant_id", "").unwrap();
        assert_eq!(form.value("pizza_restaurant_id"), "");
        assert!(form.is_dirty());

        let draft = form.validate().unwrap();
        assert_eq!(draft.pizza_restaurant_id, Some(None));
        assert_eq!(draft.name.as_deref(), Some("Margherita"));
    }

    #[test]
    fn test_reinitialize_and_reset() {
        let mut form = FormState::<MenuItem>::uninitialized();
        assert!(!form.is_initialized());

        let draft = MenuItemDraft {
            name: Some("Margherita".to_string()),
            price: Some(9.5),
            pizza_restaurant_id: None,
        };
        form.reinitialize(&draft).unwrap();
        assert!(form.is_initialized());
        assert!(!form.is_dirty());

        form.set_field("price", "10.5").unwrap();
        form.set_field("name", "").unwrap();
        assert!(form.is_dirty());
        assert_eq!(form.value("name"), "");

        form.set_submitting(true);
        form.reset();
        assert!(!form.is_submitting());
        assert_eq!(form.draft().unwrap(), draft);
    }
}
