//! View transitions requested by pages
//!
//! Routing itself happens elsewhere; pages only emit [`Route`] values through
//! a [`Navigator`].

use parking_lot::Mutex;
use pizza_admin_core::{EntityId, EntityKind};
use std::fmt;

/// Target of a view transition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Collection page
    List(EntityKind),
    /// Detail page of one record
    View(EntityKind, EntityId),
    /// Edit page of one record
    Edit(EntityKind, EntityId),
    /// Create page, optionally with a foreign key filled in
    Create {
        /// Entity type to create
        kind: EntityKind,
        /// Field name and value to prefill
        prefill: Option<(String, EntityId)>,
    },
}

impl Route {
    /// Create page without prefill
    #[must_use]
    pub const fn create(kind: EntityKind) -> Self {
        Self::Create {
            kind,
            prefill: None,
        }
    }

    /// Create page of a child record pointing back at `parent`
    #[must_use]
    pub fn create_child(kind: EntityKind, parent: EntityKind, parent_id: EntityId) -> Self {
        Self::Create {
            kind,
            prefill: Some((parent.foreign_key(), parent_id)),
        }
    }

    /// Entity type of the target page
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::List(kind) | Self::View(kind, _) | Self::Edit(kind, _) => *kind,
            Self::Create { kind, .. } => *kind,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(kind) => write!(f, "/{}", kind.path()),
            Self::View(kind, id) => write!(f, "/{}/view/{id}", kind.path()),
            Self::Edit(kind, id) => write!(f, "/{}/edit/{id}", kind.path()),
            Self::Create { kind, prefill } => {
                write!(f, "/{}/create", kind.path())?;
                if let Some((field, id)) = prefill {
                    write!(f, "?{field}={id}")?;
                }
                Ok(())
            }
        }
    }
}

/// Receiver of transition requests
pub trait Navigator: Send + Sync {
    /// Request a transition to `route`
    fn navigate(&self, route: Route);
}

/// Navigator that only records requests, in order
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every requested route
    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }

    /// Most recent request
    #[must_use]
    pub fn last(&self) -> Option<Route> {
        self.routes.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(%route, "navigation requested");
        self.routes.lock().push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Route::List(EntityKind::OrderItem), "/order-items")]
    #[case(Route::View(EntityKind::OrderItem, "oi-1".into()), "/order-items/view/oi-1")]
    #[case(Route::Edit(EntityKind::PizzaRestaurant, "r1".into()), "/pizza-restaurants/edit/r1")]
    #[case(Route::create(EntityKind::User), "/users/create")]
    #[case(
        Route::create_child(EntityKind::OrderItem, EntityKind::MenuItem, "item-1".into()),
        "/order-items/create?menu_item_id=item-1"
    )]
    fn test_route_display(#[case] route: Route, #[case] expected: &str) {
        assert_eq!(route.to_string(), expected);
    }

    #[test]
    fn test_recording_navigator_keeps_order() {
        let navigator = RecordingNavigator::new();
        assert_eq!(navigator.last(), None);

        navigator.navigate(Route::List(EntityKind::MenuItem));
        navigator.navigate(Route::View(EntityKind::MenuItem, "item-1".into()));

        assert_eq!(
            navigator.routes(),
            vec![
                Route::List(EntityKind::MenuItem),
                Route::View(EntityKind::MenuItem, "item-1".into()),
            ]
        );
        assert_eq!(navigator.last().map(|r| r.kind()), Some(EntityKind::MenuItem));
    }
}
