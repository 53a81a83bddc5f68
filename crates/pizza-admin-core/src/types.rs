//! Entity types for the pizza-ordering back office

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Opaque record identifier assigned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The entity types the back office manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A restaurant owning a menu
    PizzaRestaurant,
    /// A dish on a restaurant's menu
    MenuItem,
    /// A customer order
    Order,
    /// One menu item line within an order
    OrderItem,
    /// A platform user
    User,
}

impl EntityKind {
    /// Every entity type
    pub const ALL: [Self; 5] = [
        Self::PizzaRestaurant,
        Self::MenuItem,
        Self::Order,
        Self::OrderItem,
        Self::User,
    ];

    /// Name used for capability checks and relation expansion
    #[must_use]
    pub const fn resource_name(self) -> &'static str {
        match self {
            Self::PizzaRestaurant => "pizza_restaurant",
            Self::MenuItem => "menu_item",
            Self::Order => "order",
            Self::OrderItem => "order_item",
            Self::User => "user",
        }
    }

    /// Collection path segment of the REST resource
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::PizzaRestaurant => "pizza-restaurants",
            Self::MenuItem => "menu-items",
            Self::Order => "orders",
            Self::OrderItem => "order-items",
            Self::User => "users",
        }
    }

    /// Human readable name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::PizzaRestaurant => "Pizza Restaurant",
            Self::MenuItem => "Menu Item",
            Self::Order => "Order",
            Self::OrderItem => "Order Item",
            Self::User => "User",
        }
    }

    /// Field holding a foreign key to this entity type, e.g. `menu_item_id`
    #[must_use]
    pub fn foreign_key(self) -> String {
        format!("{}_id", self.resource_name())
    }

    /// Look up an entity type by its resource name
    #[must_use]
    pub fn from_resource_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.resource_name() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_name())
    }
}

impl FromStr for EntityKind {
    type Err = crate::Error;

    /// Accepts `menu_item`, `menu-item` and `menu-items`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| {
                let name = kind.resource_name();
                normalized == name || normalized == kind.path().replace('-', "_")
            })
            .ok_or_else(|| crate::Error::UnknownEntity { name: s.to_string() })
    }
}

/// How a form field's raw text is turned into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// Decimal number
    Number,
    /// Whole number
    Integer,
    /// Id of a record of another entity type, picked from a list
    Reference(EntityKind),
}

impl FieldKind {
    /// Parse raw input for field `name`
    ///
    /// Empty input clears the field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidField`] when the text is not a valid
    /// number for numeric fields.
    pub fn parse(self, name: &str, raw: &str) -> crate::Result<serde_json::Value> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        match self {
            Self::Text | Self::Reference(_) => Ok(serde_json::Value::String(raw.to_string())),
            Self::Number => raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .ok_or_else(|| crate::Error::invalid_field(name, format!("'{raw}' is not a number"))),
            Self::Integer => raw
                .parse::<i64>()
                .map(serde_json::Value::from)
                .map_err(|_| {
                    crate::Error::invalid_field(name, format!("'{raw}' is not a whole number"))
                }),
        }
    }
}

/// A field shown on create and edit forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    /// Draft field name
    pub name: &'static str,
    /// Label shown next to the input
    pub label: &'static str,
    /// Value type
    pub kind: FieldKind,
}

impl FormField {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind }
    }
}

/// Link from a record to a related record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationLink {
    /// Related entity type
    pub kind: EntityKind,
    /// Related record id, from the expanded relation or the foreign key
    pub id: Option<EntityId>,
    /// Link text, only known when the relation was expanded
    pub label: Option<String>,
}

/// One row of a child table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRow {
    /// Child record id
    pub id: EntityId,
    /// Cell values in column order
    pub cells: Vec<String>,
}

/// Records of another entity type owned by a parent record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildCollection {
    /// Child entity type
    pub kind: EntityKind,
    /// Field on the child pointing back at the parent
    pub foreign_key: String,
    /// Column names
    pub columns: &'static [&'static str],
    /// Rows
    pub rows: Vec<ChildRow>,
}

impl ChildCollection {
    /// Build the child table for `parent` from expanded child records
    #[must_use]
    pub fn of<C: Entity>(parent: EntityKind, records: Option<&[C]>) -> Self {
        let rows = records
            .unwrap_or_default()
            .iter()
            .map(|record| ChildRow {
                id: record.id().clone(),
                cells: C::COLUMNS
                    .iter()
                    .map(|column| record.cell(column).unwrap_or_default())
                    .collect(),
            })
            .collect();
        Self {
            kind: C::KIND,
            foreign_key: parent.foreign_key(),
            columns: C::COLUMNS,
            rows,
        }
    }
}

/// A remotely owned record type
pub trait Entity:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// Create/update payload; every field is optional on the wire
    ///
    /// Optional record fields are `Option<Option<_>>` in the draft: `None`
    /// leaves the field out, `Some(None)` sends `null` to clear it.
    type Draft: Serialize
        + DeserializeOwned
        + Validate
        + Clone
        + Default
        + PartialEq
        + fmt::Debug
        + Send
        + Sync
        + 'static;

    /// Entity type tag
    const KIND: EntityKind;
    /// Field columns of the list table
    const COLUMNS: &'static [&'static str];
    /// Entity types shown as relation columns
    const LINKED: &'static [EntityKind];
    /// Relations expanded by the list page
    const LIST_RELATIONS: &'static [&'static str];
    /// Relations expanded by the detail page
    const DETAIL_RELATIONS: &'static [&'static str];
    /// Fields of the create and edit forms
    const FORM_FIELDS: &'static [FormField];

    /// Record id
    fn id(&self) -> &EntityId;

    /// Text used when another record links to this one
    fn label(&self) -> String;

    /// Value of a list column
    fn cell(&self, column: &str) -> Option<String>;

    /// Label/value pairs of the detail view
    fn detail_fields(&self) -> Vec<(&'static str, String)>;

    /// Link to the related record of type `kind`, if this type has one
    fn linked(&self, kind: EntityKind) -> Option<RelationLink>;

    /// Child tables of the detail view
    fn children(&self) -> Vec<ChildCollection> {
        Vec::new()
    }

    /// Draft holding this record's editable values
    fn to_draft(&self) -> Self::Draft;
}

fn timestamp(value: Option<&DateTime<Utc>>) -> String {
    value.map(DateTime::to_rfc3339).unwrap_or_default()
}

fn text(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

fn link<T: Entity>(kind: EntityKind, expanded: Option<&T>, key: Option<&EntityId>) -> RelationLink {
    RelationLink {
        kind,
        id: expanded.map(|record| record.id().clone()).or_else(|| key.cloned()),
        label: expanded.map(Entity::label),
    }
}

/// A platform user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Record id
    pub id: EntityId,
    /// Email address
    pub email: String,
    /// Given name
    #[serde(rename = "firstName", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(rename = "lastName", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Id in the identity provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roq_user_id: Option<String>,
    /// Owning tenant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Deserialize a clearable draft field
///
/// A missing field stays `None` through `#[serde(default)]`; an explicit
/// `null` becomes `Some(None)`.
fn clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Create/update payload for [`User`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[allow(clippy::option_option)]
pub struct UserDraft {
    /// Email address
    #[validate(required, email)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Given name
    #[validate(length(max = 255))]
    #[serde(rename = "firstName", deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<Option<String>>,
    /// Family name
    #[validate(length(max = 255))]
    #[serde(rename = "lastName", deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<Option<String>>,
    /// Id in the identity provider
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub roq_user_id: Option<Option<String>>,
    /// Owning tenant
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Option<String>>,
}

impl Entity for User {
    type Draft = UserDraft;

    const KIND: EntityKind = EntityKind::User;
    const COLUMNS: &'static [&'static str] = &["email", "firstName", "lastName"];
    const LINKED: &'static [EntityKind] = &[];
    const LIST_RELATIONS: &'static [&'static str] = &[];
    const DETAIL_RELATIONS: &'static [&'static str] = &[];
    const FORM_FIELDS: &'static [FormField] = &[
        FormField::new("email", "Email", FieldKind::Text),
        FormField::new("firstName", "First Name", FieldKind::Text),
        FormField::new("lastName", "Last Name", FieldKind::Text),
        FormField::new("roq_user_id", "Roq User Id", FieldKind::Text),
        FormField::new("tenant_id", "Tenant Id", FieldKind::Text),
    ];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.email.clone()
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "email" => Some(self.email.clone()),
            "firstName" => Some(text(self.first_name.as_ref())),
            "lastName" => Some(text(self.last_name.as_ref())),
            _ => None,
        }
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Email", self.email.clone()),
            ("First Name", text(self.first_name.as_ref())),
            ("Last Name", text(self.last_name.as_ref())),
            ("Created At", timestamp(self.created_at.as_ref())),
            ("Updated At", timestamp(self.updated_at.as_ref())),
        ]
    }

    fn linked(&self, _kind: EntityKind) -> Option<RelationLink> {
        None
    }

    fn to_draft(&self) -> UserDraft {
        UserDraft {
            email: Some(self.email.clone()),
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            roq_user_id: Some(self.roq_user_id.clone()),
            tenant_id: Some(self.tenant_id.clone()),
        }
    }
}

/// A restaurant owning a menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PizzaRestaurant {
    /// Record id
    pub id: EntityId,
    /// Restaurant name
    pub name: String,
    /// Free text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Owning tenant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Owning user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Expanded `user` relation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<User>>,
    /// Expanded `menu_item` relation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_item: Option<Vec<MenuItem>>,
    /// Expanded `order` relation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<Order>>,
}

/// Create/update payload for [`PizzaRestaurant`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[allow(clippy::option_option)]
pub struct PizzaRestaurantDraft {
    /// Restaurant name
    #[validate(required, length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free text description
    #[validate(length(max = 2000))]
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    /// Image URL
    #[validate(length(max = 2048))]
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
    /// Owning tenant
    #[validate(length(max = 255))]
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Option<String>>,
    /// Owning user
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Option<EntityId>>,
}

impl Entity for PizzaRestaurant {
    type Draft = PizzaRestaurantDraft;

    const KIND: EntityKind = EntityKind::PizzaRestaurant;
    const COLUMNS: &'static [&'static str] = &["name", "description", "image", "tenant_id"];
    const LINKED: &'static [EntityKind] = &[EntityKind::User];
    const LIST_RELATIONS: &'static [&'static str] = &["user"];
    const DETAIL_RELATIONS: &'static [&'static str] = &["user", "menu_item", "order"];
    const FORM_FIELDS: &'static [FormField] = &[
        FormField::new("name", "Name", FieldKind::Text),
        FormField::new("description", "Description", FieldKind::Text),
        FormField::new("image", "Image", FieldKind::Text),
        FormField::new("tenant_id", "Tenant Id", FieldKind::Text),
        FormField::new("user_id", "Select User", FieldKind::Reference(EntityKind::User)),
    ];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "name" => Some(self.name.clone()),
            "description" => Some(text(self.description.as_ref())),
            "image" => Some(text(self.image.as_ref())),
            "tenant_id" => Some(text(self.tenant_id.as_ref())),
            _ => None,
        }
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone()),
            ("Description", text(self.description.as_ref())),
            ("Image", text(self.image.as_ref())),
            ("Tenant Id", text(self.tenant_id.as_ref())),
            ("Created At", timestamp(self.created_at.as_ref())),
            ("Updated At", timestamp(self.updated_at.as_ref())),
        ]
    }

    fn linked(&self, kind: EntityKind) -> Option<RelationLink> {
        match kind {
            EntityKind::User => Some(link(kind, self.user.as_deref(), self.user_id.as_ref())),
            _ => None,
        }
    }

    fn children(&self) -> Vec<ChildCollection> {
        vec![
            ChildCollection::of(Self::KIND, self.menu_item.as_deref()),
            ChildCollection::of(Self::KIND, self.order.as_deref()),
        ]
    }

    fn to_draft(&self) -> PizzaRestaurantDraft {
        PizzaRestaurantDraft {
            name: Some(self.name.clone()),
            description: Some(self.description.clone()),
            image: Some(self.image.clone()),
            tenant_id: Some(self.tenant_id.clone()),
            user_id: Some(self.user_id.clone()),
        }
    }
}

/// A dish on a restaurant's menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Record id
    pub id: EntityId,
    /// Dish name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Restaurant serving the dish
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pizza_restaurant_id: Option<EntityId>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Expanded `pizza_restaurant` relation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pizza_restaurant: Option<Box<PizzaRestaurant>>,
    /// Expanded `order_item` relation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_item: Option<Vec<OrderItem>>,
}

/// Create/update payload for [`MenuItem`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[allow(clippy::option_option)]
pub struct MenuItemDraft {
    /// Dish name
    #[validate(required, length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Unit price
    #[validate(required, range(min = 0.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Restaurant serving the dish
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub pizza_restaurant_id: Option<Option<EntityId>>,
}

impl Entity for MenuItem {
    type Draft = MenuItemDraft;

    const KIND: EntityKind = EntityKind::MenuItem;
    const COLUMNS: &'static [&'static str] = &["name", "price"];
    const LINKED: &'static [EntityKind] = &[EntityKind::PizzaRestaurant];
    const LIST_RELATIONS: &'static [&'static str] = &["pizza_restaurant"];
    const DETAIL_RELATIONS: &'static [&'static str] = &["pizza_restaurant", "order_item"];
    const FORM_FIELDS: &'static [FormField] = &[
        FormField::new("name", "Name", FieldKind::Text),
        FormField::new("price", "Price", FieldKind::Number),
        FormField::new(
            "pizza_restaurant_id",
            "Select Pizza Restaurant",
            FieldKind::Reference(EntityKind::PizzaRestaurant),
        ),
    ];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "name" => Some(self.name.clone()),
            "price" => Some(self.price.to_string()),
            _ => None,
        }
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone()),
            ("Price", self.price.to_string()),
            ("Created At", timestamp(self.created_at.as_ref())),
            ("Updated At", timestamp(self.updated_at.as_ref())),
        ]
    }

    fn linked(&self, kind: EntityKind) -> Option<RelationLink> {
        match kind {
            EntityKind::PizzaRestaurant => Some(link(
                kind,
                self.pizza_restaurant.as_deref(),
                self.pizza_restaurant_id.as_ref(),
            )),
            _ => None,
        }
    }

    fn children(&self) -> Vec<ChildCollection> {
        vec![ChildCollection::of(Self::KIND, self.order_item.as_deref())]
    }

    fn to_draft(&self) -> MenuItemDraft {
        MenuItemDraft {
            name: Some(self.name.clone()),
            price: Some(self.price),
            pizza_restaurant_id: Some(self.pizza_restaurant_id.clone()),
        }
    }
}

/// A customer order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Record id
    pub id: EntityId,
    /// Fulfilment status
    pub status: String,
    /// Ordering user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    /// Restaurant fulfilling the order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pizza_restaurant_id: Option<EntityId>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Expanded `user` relation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<User>>,
    /// Expanded `pizza_restaurant` relation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pizza_restaurant: Option<Box<PizzaRestaurant>>,
    /// Expanded `order_item` relation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_item: Option<Vec<OrderItem>>,
}

/// Create/update payload for [`Order`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[allow(clippy::option_option)]
pub struct OrderDraft {
    /// Fulfilment status
    #[validate(required, length(min = 1, max = 64))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Ordering user
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Option<EntityId>>,
    /// Restaurant fulfilling the order
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub pizza_restaurant_id: Option<Option<EntityId>>,
}

impl Entity for Order {
    type Draft = OrderDraft;

    const KIND: EntityKind = EntityKind::Order;
    const COLUMNS: &'static [&'static str] = &["status"];
    const LINKED: &'static [EntityKind] = &[EntityKind::User, EntityKind::PizzaRestaurant];
    const LIST_RELATIONS: &'static [&'static str] = &["user", "pizza_restaurant"];
    const DETAIL_RELATIONS: &'static [&'static str] = &["user", "pizza_restaurant", "order_item"];
    const FORM_FIELDS: &'static [FormField] = &[
        FormField::new("status", "Status", FieldKind::Text),
        FormField::new("user_id", "Select User", FieldKind::Reference(EntityKind::User)),
        FormField::new(
            "pizza_restaurant_id",
            "Select Pizza Restaurant",
            FieldKind::Reference(EntityKind::PizzaRestaurant),
        ),
    ];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.status.clone()
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "status" => Some(self.status.clone()),
            _ => None,
        }
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Status", self.status.clone()),
            ("Created At", timestamp(self.created_at.as_ref())),
            ("Updated At", timestamp(self.updated_at.as_ref())),
        ]
    }

    fn linked(&self, kind: EntityKind) -> Option<RelationLink> {
        match kind {
            EntityKind::User => Some(link(kind, self.user.as_deref(), self.user_id.as_ref())),
            EntityKind::PizzaRestaurant => Some(link(
                kind,
                self.pizza_restaurant.as_deref(),
                self.pizza_restaurant_id.as_ref(),
            )),
            _ => None,
        }
    }

    fn children(&self) -> Vec<ChildCollection> {
        vec![ChildCollection::of(Self::KIND, self.order_item.as_deref())]
    }

    fn to_draft(&self) -> OrderDraft {
        OrderDraft {
            status: Some(self.status.clone()),
            user_id: Some(self.user_id.clone()),
            pizza_restaurant_id: Some(self.pizza_restaurant_id.clone()),
        }
    }
}

/// One menu item line within an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Record id
    pub id: EntityId,
    /// Number of units
    pub quantity: i64,
    /// Ordered menu item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_item_id: Option<EntityId>,
    /// Order the line belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<EntityId>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Expanded `menu_item` relation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_item: Option<Box<MenuItem>>,
    /// Expanded `order` relation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Box<Order>>,
}

/// Create/update payload for [`OrderItem`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[allow(clippy::option_option)]
pub struct OrderItemDraft {
    /// Number of units
    #[validate(required, range(min = 1))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    /// Ordered menu item
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub menu_item_id: Option<Option<EntityId>>,
    /// Order the line belongs to
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Option<EntityId>>,
}

impl Entity for OrderItem {
    type Draft = OrderItemDraft;

    const KIND: EntityKind = EntityKind::OrderItem;
    const COLUMNS: &'static [&'static str] = &["quantity"];
    const LINKED: &'static [EntityKind] = &[EntityKind::MenuItem, EntityKind::Order];
    const LIST_RELATIONS: &'static [&'static str] = &["menu_item", "order"];
    const DETAIL_RELATIONS: &'static [&'static str] = &["menu_item", "order"];
    const FORM_FIELDS: &'static [FormField] = &[
        FormField::new("quantity", "Quantity", FieldKind::Integer),
        FormField::new(
            "menu_item_id",
            "Select Menu Item",
            FieldKind::Reference(EntityKind::MenuItem),
        ),
        FormField::new("order_id", "Select Order", FieldKind::Reference(EntityKind::Order)),
    ];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} x {}", self.quantity, self.menu_item.as_ref().map_or("?", |m| m.name.as_str()))
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "quantity" => Some(self.quantity.to_string()),
            _ => None,
        }
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Quantity", self.quantity.to_string()),
            ("Created At", timestamp(self.created_at.as_ref())),
            ("Updated At", timestamp(self.updated_at.as_ref())),
        ]
    }

    fn linked(&self, kind: EntityKind) -> Option<RelationLink> {
        match kind {
            EntityKind::MenuItem => Some(link(
                kind,
                self.menu_item.as_deref(),
                self.menu_item_id.as_ref(),
            )),
            EntityKind::Order => Some(link(kind, self.order.as_deref(), self.order_id.as_ref())),
            _ => None,
        }
    }

    fn to_draft(&self) -> OrderItemDraft {
        OrderItemDraft {
            quantity: Some(self.quantity),
            menu_item_id: Some(self.menu_item_id.clone()),
            order_id: Some(self.order_id.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("menu_item", EntityKind::MenuItem)]
    #[case("menu-item", EntityKind::MenuItem)]
    #[case("menu-items", EntityKind::MenuItem)]
    #[case("Order-Items", EntityKind::OrderItem)]
    #[case("pizza_restaurant", EntityKind::PizzaRestaurant)]
    #[case("orders", EntityKind::Order)]
    #[case("user", EntityKind::User)]
    fn test_entity_kind_from_str(#[case] input: &str, #[case] expected: EntityKind) {
        assert_eq!(input.parse::<EntityKind>().unwrap(), expected);
    }

    #[test]
    fn test_entity_kind_from_str_rejects_unknown() {
        let err = "calzone".parse::<EntityKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown entity type: calzone");
    }

    #[test]
    fn test_entity_kind_names() {
        assert_eq!(EntityKind::OrderItem.path(), "order-items");
        assert_eq!(EntityKind::OrderItem.resource_name(), "order_item");
        assert_eq!(EntityKind::OrderItem.foreign_key(), "order_item_id");
        assert_eq!(
            EntityKind::from_resource_name("pizza_restaurant"),
            Some(EntityKind::PizzaRestaurant)
        );
        assert_eq!(EntityKind::from_resource_name("pizza-restaurants"), None);
    }

    #[test]
    fn test_menu_item_without_timestamps_or_relations() {
        let item: MenuItem =
            serde_json::from_str(r#"{"id":"item-1","name":"Margherita","price":9.5}"#).unwrap();
        assert_eq!(item.id, EntityId::from("item-1"));
        assert_eq!(item.price, 9.5);
        assert!(item.created_at.is_none());
        assert!(item.order_item.is_none());

        let round = serde_json::to_value(&item).unwrap();
        assert_eq!(
            round,
            serde_json::json!({"id":"item-1","name":"Margherita","price":9.5})
        );
    }

    #[test]
    fn test_partial_draft_serializes_only_set_fields() {
        let draft = MenuItemDraft {
            price: Some(10.5),
            ..MenuItemDraft::default()
        };
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            serde_json::json!({"price": 10.5})
        );
    }

    #[test]
    fn test_cleared_draft_field_serializes_as_null() {
        let draft = PizzaRestaurantDraft {
            name: Some("Luigi's".to_string()),
            description: Some(None),
            ..PizzaRestaurantDraft::default()
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"name": "Luigi's", "description": null})
        );

        let back: PizzaRestaurantDraft = serde_json::from_value(value).unwrap();
        assert_eq!(back, draft);
        assert_eq!(back.image, None);
        assert!(back.validate().is_ok());
    }

    #[test]
    fn test_user_uses_camel_case_names() {
        let user: User = serde_json::from_str(
            r#"{"id":"u1","email":"ada@example.com","firstName":"Ada","lastName":"Lovelace"}"#,
        )
        .unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
        assert_eq!(user.cell("lastName").as_deref(), Some("Lovelace"));
    }

    #[test]
    fn test_linked_prefers_expanded_relation() {
        let item: OrderItem = serde_json::from_value(serde_json::json!({
            "id": "oi-1",
            "quantity": 2,
            "menu_item_id": "item-1",
            "order_id": "order-1",
            "menu_item": {"id": "item-1", "name": "Margherita", "price": 9.5}
        }))
        .unwrap();

        let menu = item.linked(EntityKind::MenuItem).unwrap();
        assert_eq!(menu.id, Some(EntityId::from("item-1")));
        assert_eq!(menu.label.as_deref(), Some("Margherita"));

        let order = item.linked(EntityKind::Order).unwrap();
        assert_eq!(order.id, Some(EntityId::from("order-1")));
        assert_eq!(order.label, None);

        assert!(item.linked(EntityKind::User).is_none());
    }

    #[test]
    fn test_children_of_menu_item() {
        let item: MenuItem = serde_json::from_value(serde_json::json!({
            "id": "item-1",
            "name": "Margherita",
            "price": 9.5,
            "order_item": [
                {"id": "oi-1", "quantity": 2},
                {"id": "oi-2", "quantity": 5}
            ]
        }))
        .unwrap();

        let children = item.children();
        assert_eq!(children.len(), 1);
        let table = children.first().unwrap();
        assert_eq!(table.kind, EntityKind::OrderItem);
        assert_eq!(table.foreign_key, "menu_item_id");
        assert_eq!(table.columns, &["quantity"]);
        assert_eq!(
            table.rows,
            vec![
                ChildRow {
                    id: "oi-1".into(),
                    cells: vec!["2".to_string()]
                },
                ChildRow {
                    id: "oi-2".into(),
                    cells: vec!["5".to_string()]
                },
            ]
        );
    }

    #[test]
    fn test_drafts_validate() {
        let empty = MenuItemDraft::default();
        let errors = empty.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));

        let negative = MenuItemDraft {
            name: Some("Marinara".to_string()),
            price: Some(-1.0),
            pizza_restaurant_id: None,
        };
        assert!(negative.validate().is_err());

        let user = UserDraft {
            email: Some("not-an-email".to_string()),
            ..UserDraft::default()
        };
        assert!(user.validate().is_err());

        let item = OrderItemDraft {
            quantity: Some(3),
            ..OrderItemDraft::default()
        };
        assert!(item.validate().is_ok());
    }

    #[rstest]
    #[case(FieldKind::Text, " Diavola ", serde_json::json!("Diavola"))]
    #[case(FieldKind::Number, "10.5", serde_json::json!(10.5))]
    #[case(FieldKind::Integer, "3", serde_json::json!(3))]
    #[case(FieldKind::Reference(EntityKind::User), "u1", serde_json::json!("u1"))]
    #[case(FieldKind::Number, "", serde_json::Value::Null)]
    fn test_field_kind_parse(
        #[case] kind: FieldKind,
        #[case] raw: &str,
        #[case] expected: serde_json::Value,
    ) {
        assert_eq!(kind.parse("field", raw).unwrap(), expected);
    }

    #[test]
    fn test_field_kind_parse_rejects_bad_numbers() {
        assert!(FieldKind::Number.parse("price", "cheap").is_err());
        assert!(FieldKind::Integer.parse("quantity", "2.5").is_err());
    }

    #[test]
    fn test_to_draft_round_trips_editable_values() {
        let restaurant = PizzaRestaurant {
            id: "r1".into(),
            name: "Luigi's".to_string(),
            description: Some("Wood fired".to_string()),
            image: None,
            tenant_id: Some("t1".to_string()),
            user_id: Some("u1".into()),
            created_at: None,
            updated_at: None,
            user: None,
            menu_item: None,
            order: None,
        };
        let draft = restaurant.to_draft();
        assert_eq!(draft.name.as_deref(), Some("Luigi's"));
        assert_eq!(draft.user_id, Some(Some(EntityId::from("u1"))));
        assert_eq!(draft.image, Some(None));
        assert!(draft.validate().is_ok());
    }
}
