//! Capability model shared by every page
//!
//! Authorization itself belongs to an external service. This module only
//! defines the shape of a capability question, `(entity type, operation,
//! scope)`, and the [`AccessControl`] seam through which the answer is
//! obtained. [`StaticPolicy`] is a config-driven answer source for setups
//! without a live authorization service.

use crate::types::EntityKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operation a capability grant covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOperation {
    /// Create new records
    Create,
    /// Read records and follow links to them
    Read,
    /// Edit existing records
    Update,
    /// Remove records
    Delete,
}

impl AccessOperation {
    /// All operations, in CRUD order
    pub const ALL: [Self; 4] = [Self::Create, Self::Read, Self::Update, Self::Delete];

    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for AccessOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessOperation {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::Error::UnknownOperation { name: s.to_string() })
    }
}

/// Scope a grant applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessScope {
    /// Whole project (every page in this tool asks at this scope)
    #[default]
    Project,
    /// Records of the caller's tenant
    Tenant,
    /// Records the caller owns
    Owner,
}

/// Source of capability answers
///
/// Implementations must be side-effect free: pages ask the same question
/// many times per render and expect the current answer every time.
pub trait AccessControl: Send + Sync {
    /// Whether `operation` on `kind` is granted at `scope`
    fn has_access(&self, kind: EntityKind, operation: AccessOperation, scope: AccessScope)
    -> bool;
}

impl<F> AccessControl for F
where
    F: Fn(EntityKind, AccessOperation, AccessScope) -> bool + Send + Sync,
{
    fn has_access(
        &self,
        kind: EntityKind,
        operation: AccessOperation,
        scope: AccessScope,
    ) -> bool {
        self(kind, operation, scope)
    }
}

/// One configured grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Entity type the grant covers
    pub entity: EntityKind,
    /// Operations allowed on that entity type
    pub operations: Vec<AccessOperation>,
    /// Scope of the grant
    #[serde(default)]
    pub scope: AccessScope,
}

impl Grant {
    /// Grant every operation on `entity` at project scope
    #[must_use]
    pub fn full(entity: EntityKind) -> Self {
        Self {
            entity,
            operations: AccessOperation::ALL.to_vec(),
            scope: AccessScope::Project,
        }
    }

    /// Grant read-only access to `entity` at project scope
    #[must_use]
    pub fn read_only(entity: EntityKind) -> Self {
        Self {
            entity,
            operations: vec![AccessOperation::Read],
            scope: AccessScope::Project,
        }
    }

    fn covers(&self, kind: EntityKind, operation: AccessOperation, scope: AccessScope) -> bool {
        self.entity == kind && self.scope == scope && self.operations.contains(&operation)
    }
}

/// Grant list answering capability questions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticPolicy {
    allow_all: bool,
    grants: Vec<Grant>,
}

impl StaticPolicy {
    /// Policy granting everything
    #[must_use]
    pub const fn allow_all() -> Self {
        Self {
            allow_all: true,
            grants: Vec::new(),
        }
    }

    /// Policy granting exactly `grants`
    #[must_use]
    pub const fn from_grants(grants: Vec<Grant>) -> Self {
        Self {
            allow_all: false,
            grants,
        }
    }

    /// Build the policy described by the `[access]` config section
    #[must_use]
    pub fn from_config(config: &crate::config::AccessConfig) -> Self {
        Self {
            allow_all: config.allow_all,
            grants: config.grants.clone(),
        }
    }

    /// Add a grant
    #[must_use]
    pub fn with_grant(mut self, grant: Grant) -> Self {
        self.grants.push(grant);
        self
    }

    /// Configured grants
    #[must_use]
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }
}

impl AccessControl for StaticPolicy {
    fn has_access(
        &self,
        kind: EntityKind,
        operation: AccessOperation,
        scope: AccessScope,
    ) -> bool {
        self.allow_all
            || self
                .grants
                .iter()
                .any(|grant| grant.covers(kind, operation, scope))
    }
}
