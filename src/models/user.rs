use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

lazy_static! {
    /// Usernames: alphanumeric, underscores, hyphens. Shared by every
    /// payload that carries a username.
    pub static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Role of a user. Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May manage all users and all tasks.
    Admin,
    /// May only see and mutate their own tasks; no access to user management.
    Basic,
}

/// A user row as stored in the database.
///
/// Deliberately does NOT implement `Serialize`: the `password` field must
/// never reach a response body, so every outbound path goes through
/// [`PublicUser`] via [`User::into_public`].
#[derive(Debug, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// bcrypt hash of the user's password.
    pub password: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Strips the password hash, leaving only the fields safe to serialize.
    pub fn into_public(self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            avatar: self.avatar,
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The client-visible projection of a user. This is also the principal type
/// attached to authenticated requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for the admin-only user creation endpoint.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(email)]
    pub email: String,
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    #[validate(length(min = 6))]
    pub password: String,
    /// Avatar URL. Third-party upload is out of scope; the URL is stored
    /// as given.
    #[validate(url)]
    pub avatar: Option<String>,
    pub role: Role,
}

/// Payload for the admin-only user update endpoint. Password and avatar are
/// not updatable through this route.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(email)]
    pub email: String,
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    pub role: Role,
}
