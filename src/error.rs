//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. It centralizes error management, providing a consistent way to
//! represent the failure taxonomy of the API: validation failures, missing or
//! invalid credentials, role-gate rejections, missing rows, unique-constraint
//! conflicts, and unexpected database/signing failures.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert
//! application errors into HTTP responses with a `{"message": ...}` JSON body.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError` allow propagation
//! with the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid or expired credentials (HTTP 401).
    Unauthorized(String),
    /// Role check failed (HTTP 401 — the API reports role-gate failures with
    /// the same status as authentication failures).
    Forbidden(String),
    /// Malformed request (HTTP 400).
    BadRequest(String),
    /// Failed input validation (HTTP 400). Wraps `validator` errors.
    Validation(String),
    /// Requested row does not exist, or is not visible to the principal
    /// (HTTP 404).
    NotFound(String),
    /// A unique field (email, username) is already taken (HTTP 409).
    Conflict(String),
    /// Database failure other than not-found/unique-violation (HTTP 500).
    Database(String),
    /// Unexpected server-side failure, e.g. password hashing or token
    /// signing (HTTP 500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Database(msg) => write!(f, "Database Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl AppError {
    fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) | AppError::Forbidden(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.message()
        }))
    }
}

/// `RowNotFound` maps to a clean 404 and unique-constraint violations to a
/// 409; everything else is a generic database failure. The unique-violation
/// mapping also covers the create race the explicit existence checks cannot.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("A unique field is already taken".into())
            }
            _ => AppError::Database(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// JWT processing failures (bad signature, expiry, malformed token) are
/// authentication failures, never server errors.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}

/// Error handler for `web::JsonConfig`: a malformed or undeserializable JSON
/// body is reported as a 400 with the usual `{"message"}` body instead of
/// actix's default plain-text response.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
}
