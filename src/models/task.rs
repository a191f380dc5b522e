use crate::pagination::PageQuery;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    /// Whether the task has been completed.
    pub completed: bool,
    /// Identifier of the owning user.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating or updating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Defaults to `false` when omitted on create.
    #[serde(default)]
    pub completed: bool,

    /// Requested owner. Only honored for admin principals; basic principals
    /// always own what they create and cannot reassign.
    pub user_id: Option<i32>,
}

/// Query parameters for the task list endpoint: the common list parameters
/// plus an optional `userId` owner filter (admin only).
///
/// Kept as a flat struct rather than embedding [`PageQuery`] because
/// `serde_urlencoded` does not support flattened numeric fields.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub search: Option<String>,
    pub rpp: Option<i64>,
    pub page: Option<i64>,
    pub sort: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<i32>,
}

impl TaskListQuery {
    /// The common pagination/sort/search view of this query.
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            search: self.search.clone(),
            rpp: self.rpp,
            page: self.page,
            sort: self.sort.clone(),
        }
    }
}
