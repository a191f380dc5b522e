//! Role-based access policy for task rows.
//!
//! The same ownership rules apply before every store call, so they live in
//! one place instead of being re-derived inside each handler: a `basic`
//! principal is always pinned to its own rows, an `admin` may target any
//! user's rows and reassign ownership.

use crate::models::user::{PublicUser, Role};

/// The set of task rows a principal may see and mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// Any row, any owner (admin).
    Any,
    /// Only rows owned by the given user id (basic).
    Owner(i32),
}

impl TaskScope {
    pub fn for_principal(principal: &PublicUser) -> Self {
        match principal.role {
            Role::Admin => TaskScope::Any,
            Role::Basic => TaskScope::Owner(principal.id),
        }
    }

    /// Owner filter for list/count queries. A basic principal is always
    /// filtered to itself, regardless of any `userId` the client supplied;
    /// an admin may request a specific owner or (with `None`) all rows.
    pub fn list_filter(self, requested: Option<i32>) -> Option<i32> {
        match self {
            TaskScope::Any => requested,
            TaskScope::Owner(id) => Some(id),
        }
    }

    /// Whether a row with the given owner is visible/mutable in this scope.
    pub fn allows(self, owner: i32) -> bool {
        match self {
            TaskScope::Any => true,
            TaskScope::Owner(id) => id == owner,
        }
    }

    /// Owner for a newly created task. Admins may assign an explicit owner,
    /// falling back to themselves; basic principals always own their tasks.
    pub fn owner_for_create(self, requested: Option<i32>, self_id: i32) -> i32 {
        match self {
            TaskScope::Any => requested.unwrap_or(self_id),
            TaskScope::Owner(id) => id,
        }
    }

    /// Owner after an update. Admins may reassign, falling back to the
    /// existing owner; basic principals cannot change ownership.
    pub fn owner_for_update(self, requested: Option<i32>, existing: i32) -> i32 {
        match self {
            TaskScope::Any => requested.unwrap_or(existing),
            TaskScope::Owner(_) => existing,
        }
    }
}
