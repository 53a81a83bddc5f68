//! Error types for the view layer

use pizza_admin_core::{AccessOperation, EntityKind};
use thiserror::Error;

/// Result type alias for page operations
pub type ViewResult<T> = Result<T, ViewError>;

/// Errors raised by pages
///
/// Remote failures never appear here: they are captured in controller state.
#[derive(Error, Debug)]
pub enum ViewError {
    /// The viewer lacks the grant a page needs to mount
    #[error("{operation} access to {kind} is required")]
    Forbidden {
        /// Entity type of the page
        kind: EntityKind,
        /// Operation the page requires
        operation: AccessOperation,
    },

    /// Form input was rejected
    #[error(transparent)]
    Core(#[from] pizza_admin_core::Error),
}

impl ViewError {
    /// Whether the error is a missing grant
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_forbidden_display() {
        let error = ViewError::Forbidden {
            kind: EntityKind::OrderItem,
            operation: AccessOperation::Update,
        };
        assert_eq!(error.to_string(), "update access to order_item is required");
        assert!(error.is_forbidden());
    }

    #[test]
    fn test_core_error_is_transparent() {
        let error = ViewError::from(pizza_admin_core::Error::invalid_field("price", "'x' is not a number"));
        assert!(!error.is_forbidden());
        assert!(error.to_string().contains("price"));
    }
}
