//! User-management routes. All handlers take `AdminPrincipal`: the
//! authorization gate attaches the principal and the extractor rejects
//! `basic` roles before any query runs.

use crate::{
    auth::{hash_password, AdminPrincipal},
    error::AppError,
    models::user::{CreateUserInput, PublicUser, UpdateUserInput, User},
    pagination::{paginate, PageQuery},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, password, avatar, role, \
                            created_at, updated_at";

/// Lists users with substring search on first or last name, fixed `id` sort
/// key, and page metadata.
#[get("")]
pub async fn list_users(
    pool: web::Data<PgPool>,
    query: web::Query<PageQuery>,
    _admin: AdminPrincipal,
) -> Result<impl Responder, AppError> {
    let pattern = query.search_pattern();

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE first_name LIKE $1 OR last_name LIKE $1")
            .bind(&pattern)
            .fetch_one(&**pool)
            .await?;

    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE first_name LIKE $1 OR last_name LIKE $1 \
         ORDER BY id {} LIMIT $2 OFFSET $3",
        query.order()
    );
    let users = sqlx::query_as::<_, User>(&sql)
        .bind(&pattern)
        .bind(query.rpp())
        .bind(query.offset())
        .fetch_all(&**pool)
        .await?;

    let result: Vec<PublicUser> = users.into_iter().map(User::into_public).collect();

    Ok(HttpResponse::Ok().json(json!({
        "result": result,
        "pagination": paginate(query.rpp(), query.page(), total),
    })))
}

/// Creates a user with an explicit role. Fails with 409 if the email or
/// username is already taken. The avatar is stored as an opaque URL.
#[post("")]
pub async fn create_user(
    pool: web::Data<PgPool>,
    payload: web::Json<CreateUserInput>,
    _admin: AdminPrincipal,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let existing: Option<i32> =
        sqlx::query_scalar("SELECT id FROM users WHERE email = $1 OR username = $2")
            .bind(&payload.email)
            .bind(&payload.username)
            .fetch_optional(&**pool)
            .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Employee already exists".into()));
    }

    let hashed = hash_password(&payload.password)?;

    let sql = format!(
        "INSERT INTO users (email, username, first_name, last_name, password, avatar, role) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(&payload.email)
        .bind(&payload.username)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&hashed)
        .bind(&payload.avatar)
        .bind(payload.role)
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Created().json(json!({ "user": user.into_public() })))
}

/// Fetches a single user by id.
#[get("/{id}")]
pub async fn get_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<i32>,
    _admin: AdminPrincipal,
) -> Result<impl Responder, AppError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(user_id.into_inner())
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({ "user": user.into_public() })))
}

/// Updates a user's identity fields and role. Password and avatar are not
/// updatable through this route.
#[put("/{id}")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<i32>,
    payload: web::Json<UpdateUserInput>,
    _admin: AdminPrincipal,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let sql = format!(
        "UPDATE users SET email = $1, username = $2, first_name = $3, last_name = $4, \
         role = $5, updated_at = NOW() WHERE id = $6 RETURNING {USER_COLUMNS}"
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(&payload.email)
        .bind(&payload.username)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(payload.role)
        .bind(user_id.into_inner())
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({ "user": user.into_public() })))
}

/// Deletes a user and returns the removed row, stripped. A missing id is a
/// clean 404.
#[delete("/{id}")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<i32>,
    _admin: AdminPrincipal,
) -> Result<impl Responder, AppError> {
    let sql = format!("DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(user_id.into_inner())
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({ "user": user.into_public() })))
}
