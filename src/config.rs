use std::env;

/// Application configuration, built once from the environment at startup and
/// shared with handlers through `web::Data<Config>`.
#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub environment: String,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .expect("PORT must be a number"),
            jwt_secret: env::var("SECRET").expect("SECRET must be set"),
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
