pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use crate::auth::AuthMiddleware;
use actix_web::web;

/// Wires the `/api/v1` route tree. Login, logout and signup are public;
/// everything else sits behind the authorization gate. The role gate for
/// `/users` is enforced by the `AdminPrincipal` extractor on each handler.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::logout)
        .service(auth::signup)
        .service(
            web::scope("")
                .wrap(AuthMiddleware)
                .service(auth::current_employee)
                .service(
                    web::scope("/users")
                        .service(users::list_users)
                        .service(users::create_user)
                        .service(users::get_user)
                        .service(users::update_user)
                        .service(users::delete_user),
                )
                .service(
                    web::scope("/tasks")
                        .service(tasks::list_tasks)
                        .service(tasks::create_task)
                        .service(tasks::get_task)
                        .service(tasks::update_task)
                        .service(tasks::delete_task),
                ),
        );
}
