use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::user::{PublicUser, Role};

/// The acting principal: the password-stripped user attached to the request
/// by `AuthMiddleware`.
///
/// If no principal is present (the middleware did not run, or failed to
/// insert it), extraction fails with `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct Principal(pub PublicUser);

impl FromRequest for Principal {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<PublicUser>().cloned() {
            Some(user) => ready(Ok(Principal(user))),
            None => {
                let err = AppError::Unauthorized(
                    "Principal not found in request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

/// Role gate for user-management routes: a principal whose role is `basic`
/// is rejected. The rejection is reported with status 401.
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub PublicUser);

impl FromRequest for AdminPrincipal {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<PublicUser>().cloned() {
            Some(user) if user.role == Role::Admin => ready(Ok(AdminPrincipal(user))),
            Some(_) => {
                let err = AppError::Forbidden("you are not allowed".to_string());
                ready(Err(err.into()))
            }
            None => {
                let err = AppError::Unauthorized(
                    "Principal not found in request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
