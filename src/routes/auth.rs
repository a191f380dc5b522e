use crate::{
    auth::{
        generate_token, hash_password, verify_password, AuthResponse, LoginRequest, Principal,
        SignupRequest,
    },
    config::Config,
    error::AppError,
    models::user::{Role, User},
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Authenticates a user by email and password.
///
/// An unknown email and a wrong password fail with the same 401 so the
/// response does not reveal which of the two was wrong. On success the signed
/// access token is returned in the body together with the stripped user;
/// clients send it back as `Authorization: Bearer <token>`.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, username, first_name, last_name, password, avatar, role, \
         created_at, updated_at FROM users WHERE email = $1",
    )
    .bind(&login_data.email)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    if !verify_password(&login_data.password, &user.password) {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let user = user.into_public();
    let token = generate_token(&user, &config.jwt_secret)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "User Logged successfully".to_string(),
        token,
        user,
    }))
}

/// Acknowledges a logout. Tokens are stateless, so there is nothing to clear
/// server-side; clients discard the token.
#[post("/logout")]
pub async fn logout() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "User Logged out"
    }))
}

/// Creates a new account. The role is always forced to `basic`.
///
/// Fails with 409 if the email or username is already taken.
#[post("/signup")]
pub async fn signup(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    signup_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    signup_data.validate()?;

    let existing: Option<i32> =
        sqlx::query_scalar("SELECT id FROM users WHERE email = $1 OR username = $2")
            .bind(&signup_data.email)
            .bind(&signup_data.username)
            .fetch_optional(&**pool)
            .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email or username already taken".into()));
    }

    let hashed = hash_password(&signup_data.password)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, username, first_name, last_name, password, role) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, email, username, first_name, last_name, password, avatar, role, \
         created_at, updated_at",
    )
    .bind(&signup_data.email)
    .bind(&signup_data.username)
    .bind(&signup_data.first_name)
    .bind(&signup_data.last_name)
    .bind(&hashed)
    .bind(Role::Basic)
    .fetch_one(&**pool)
    .await?;

    let user = user.into_public();
    let token = generate_token(&user, &config.jwt_secret)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User Created successfully".to_string(),
        token,
        user,
    }))
}

/// Returns the acting principal, password stripped.
#[get("/current_employee")]
pub async fn current_employee(principal: Principal) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(json!({ "user": principal.0 })))
}
