use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;

use crate::auth::token::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::models::user::User;

/// Authorization gate for protected routes.
///
/// Reads the bearer token from the `Authorization` header, verifies it, then
/// re-queries the user row by the id embedded in the claims — the embedded
/// profile fields are never trusted as current truth. The password-stripped
/// user is attached to request extensions as the acting principal.
///
/// Fails with 401 when the header is missing, the token does not verify, or
/// the user row no longer exists.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    // Rc because the principal lookup awaits a database query before the
    // inner service can be called.
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let config = req
                .app_data::<web::Data<Config>>()
                .cloned()
                .ok_or_else(|| AppError::Internal("Config is not configured".into()))?;
            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| AppError::Internal("Database pool is not configured".into()))?;

            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .ok_or_else(|| AppError::Unauthorized("Authorization token required".into()))?;

            let claims = verify_token(token, &config.jwt_secret)?;

            // The token may outlive the account; a deleted user must not
            // reach any handler.
            let user = sqlx::query_as::<_, User>(
                "SELECT id, email, username, first_name, last_name, password, avatar, role, \
                 created_at, updated_at FROM users WHERE id = $1",
            )
            .bind(claims.sub)
            .fetch_optional(&**pool)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::Unauthorized("User is not authorized".into()))?;

            req.extensions_mut().insert(user.into_public());

            service.call(req).await
        })
    }
}
