use crate::error::AppError;
use crate::models::user::{PublicUser, Role};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Tokens are valid for 30 days from issuance.
pub const TOKEN_TTL_DAYS: i64 = 30;

/// Claims encoded within an access token: the user id plus a copy of the
/// non-secret identity fields. The password hash is never part of a token.
///
/// The authorization middleware only trusts `sub`; the profile fields are a
/// convenience snapshot for clients and are re-queried from the store on
/// every protected request.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: i32,
    pub email: String,
    pub username: String,
    pub role: Role,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
}

impl Claims {
    fn for_user(user: &PublicUser) -> Self {
        let now = chrono::Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::days(TOKEN_TTL_DAYS))
            .expect("valid timestamp")
            .timestamp() as usize;

        Self {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            exp: expiration,
            iat: now.timestamp() as usize,
        }
    }
}

/// Signs an access token for the given (already password-stripped) user.
///
/// Returns `AppError::Internal` if token encoding fails.
pub fn generate_token(user: &PublicUser, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        &Claims::for_user(user),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

/// Verifies a token string and decodes its claims.
///
/// Any failure (malformed token, bad signature, expiry) is reported as
/// `AppError::Unauthorized`, never a server error.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}
