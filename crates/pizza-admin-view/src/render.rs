//! Capability queries scoped to one render pass

use parking_lot::Mutex;
use pizza_admin_core::{AccessControl, AccessOperation, AccessScope, EntityKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Capability query interface for building one view
///
/// The first answer to each `(entity type, operation)` question is kept for
/// the lifetime of the pass, so every element of one render agrees. Answers
/// are never carried into the next pass: start a new one per render.
pub struct RenderPass {
    access: Arc<dyn AccessControl>,
    scope: AccessScope,
    answers: Mutex<HashMap<(EntityKind, AccessOperation), bool>>,
}

impl std::fmt::Debug for RenderPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPass")
            .field("scope", &self.scope)
            .field("answers", &*self.answers.lock())
            .finish_non_exhaustive()
    }
}

impl RenderPass {
    /// Start a pass over `access`
    #[must_use]
    pub fn new(access: Arc<dyn AccessControl>, scope: AccessScope) -> Self {
        Self {
            access,
            scope,
            answers: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `operation` on `kind` is granted in this pass
    #[must_use]
    pub fn can(&self, kind: EntityKind, operation: AccessOperation) -> bool {
        *self
            .answers
            .lock()
            .entry((kind, operation))
            .or_insert_with(|| self.access.has_access(kind, operation, self.scope))
    }

    /// READ on `kind`
    #[must_use]
    pub fn can_read(&self, kind: EntityKind) -> bool {
        self.can(kind, AccessOperation::Read)
    }

    /// Number of distinct questions forwarded to the predicate so far
    #[must_use]
    pub fn questions_asked(&self) -> usize {
        self.answers.lock().len()
    }
}
