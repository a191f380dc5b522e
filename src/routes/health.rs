use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

/// Liveness endpoint.
#[get("/api")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "server is working smoothly"
    }))
}

/// Fallback for any unmatched route.
pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(json!({
        "message": "Not Found Route"
    }))
}
