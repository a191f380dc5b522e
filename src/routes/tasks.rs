//! Task routes. Every handler resolves a [`TaskScope`] from the principal's
//! role and applies it before touching the store, so `basic` users only ever
//! see and mutate their own rows while admins may target any owner.

use crate::{
    auth::Principal,
    error::AppError,
    models::{Task, TaskInput, TaskListQuery},
    pagination::paginate,
    policy::TaskScope,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

const TASK_COLUMNS: &str = "id, title, description, completed, user_id, created_at, updated_at";

/// Lists tasks with substring search on the title, fixed `id` sort key and
/// page metadata. The owner filter comes from the scope: a `userId` query
/// parameter is only honored for admins.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    query: web::Query<TaskListQuery>,
    principal: Principal,
) -> Result<impl Responder, AppError> {
    let scope = TaskScope::for_principal(&principal.0);
    let owner = scope.list_filter(query.user_id);
    let page = query.page_query();
    let pattern = page.search_pattern();

    let (total, tasks): (i64, Vec<Task>) = match owner {
        Some(owner) => {
            let total =
                sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE title LIKE $1 AND user_id = $2")
                    .bind(&pattern)
                    .bind(owner)
                    .fetch_one(&**pool)
                    .await?;
            let sql = format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE title LIKE $1 AND user_id = $2 \
                 ORDER BY id {} LIMIT $3 OFFSET $4",
                page.order()
            );
            let tasks = sqlx::query_as::<_, Task>(&sql)
                .bind(&pattern)
                .bind(owner)
                .bind(page.rpp())
                .bind(page.offset())
                .fetch_all(&**pool)
                .await?;
            (total, tasks)
        }
        None => {
            let total = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE title LIKE $1")
                .bind(&pattern)
                .fetch_one(&**pool)
                .await?;
            let sql = format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE title LIKE $1 \
                 ORDER BY id {} LIMIT $2 OFFSET $3",
                page.order()
            );
            let tasks = sqlx::query_as::<_, Task>(&sql)
                .bind(&pattern)
                .bind(page.rpp())
                .bind(page.offset())
                .fetch_all(&**pool)
                .await?;
            (total, tasks)
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "result": tasks,
        "pagination": paginate(page.rpp(), page.page(), total),
    })))
}

/// Creates a task. The owner is resolved by the scope: self for `basic`
/// principals, the requested `user_id` (or self) for admins.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    payload: web::Json<TaskInput>,
    principal: Principal,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let scope = TaskScope::for_principal(&principal.0);
    let owner = scope.owner_for_create(payload.user_id, principal.0.id);

    let sql = format!(
        "INSERT INTO tasks (title, description, completed, user_id) \
         VALUES ($1, $2, $3, $4) RETURNING {TASK_COLUMNS}"
    );
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.completed)
        .bind(owner)
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Created().json(json!({ "task": task })))
}

/// Fetches a single task. A row outside the principal's scope reads as
/// missing, so foreign ids do not leak existence.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    principal: Principal,
) -> Result<impl Responder, AppError> {
    let scope = TaskScope::for_principal(&principal.0);

    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(task_id.into_inner())
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    if !scope.allows(task.user_id) {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "task": task })))
}

/// Updates a task's fields. Only admins may reassign ownership; a `basic`
/// principal's `user_id` in the payload is ignored and the existing owner
/// kept.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    payload: web::Json<TaskInput>,
    principal: Principal,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let scope = TaskScope::for_principal(&principal.0);
    let task_id = task_id.into_inner();

    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
    let existing = sqlx::query_as::<_, Task>(&sql)
        .bind(task_id)
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    if !scope.allows(existing.user_id) {
        return Err(AppError::NotFound("Task not found".into()));
    }

    let owner = scope.owner_for_update(payload.user_id, existing.user_id);

    let sql = format!(
        "UPDATE tasks SET title = $1, description = $2, completed = $3, user_id = $4, \
         updated_at = NOW() WHERE id = $5 RETURNING {TASK_COLUMNS}"
    );
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.completed)
        .bind(owner)
        .bind(task_id)
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "task": task })))
}

/// Deletes a task and returns the removed row. For `basic` principals the
/// delete statement itself is owner-scoped, so a foreign id reads as missing.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    principal: Principal,
) -> Result<impl Responder, AppError> {
    let scope = TaskScope::for_principal(&principal.0);

    let task = match scope {
        TaskScope::Any => {
            let sql = format!("DELETE FROM tasks WHERE id = $1 RETURNING {TASK_COLUMNS}");
            sqlx::query_as::<_, Task>(&sql)
                .bind(task_id.into_inner())
                .fetch_optional(&**pool)
                .await?
        }
        TaskScope::Owner(owner) => {
            let sql =
                format!("DELETE FROM tasks WHERE id = $1 AND user_id = $2 RETURNING {TASK_COLUMNS}");
            sqlx::query_as::<_, Task>(&sql)
                .bind(task_id.into_inner())
                .bind(owner)
                .fetch_optional(&**pool)
                .await?
        }
    }
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({ "task": task })))
}
