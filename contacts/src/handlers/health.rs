use actix_web::{get, HttpResponse};
use chrono::Utc;
use serde_json::json;

#[get("/api/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Server is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Georgia Air and Heating LLC API Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "contact": "/api/contact",
            "health": "/api/health",
        },
    }))
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "success": false,
        "message": "Endpoint not found",
    }))
}
