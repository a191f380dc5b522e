pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::{PublicUser, USERNAME_REGEX};

// Re-export necessary items
pub use extractors::{AdminPrincipal, Principal};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

/// Payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email)]
    pub email: String,
    /// User's password. Length is not constrained here: any non-matching
    /// password fails with the same 401 as an unknown email.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Payload for a new user signup request. The role is always forced to
/// `basic`; only an admin can create privileged accounts.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
    /// Between 3 and 32 characters; alphanumeric, underscores, or hyphens.
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
}

/// Response after successful authentication (login or signup): the signed
/// access token plus the password-stripped user.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}
