use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use taskdeck::config::Config;
use taskdeck::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    log::info!("taskdeck listening on {}", config.server_url());

    let bind = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::JsonConfig::default().error_handler(taskdeck::error::json_error_handler))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::new("%r %s"))
            .service(routes::health::health)
            .service(web::scope("/api/v1").configure(routes::config))
            .default_service(web::route().to(routes::health::not_found))
    })
    .bind(bind)?
    .run()
    .await
}
