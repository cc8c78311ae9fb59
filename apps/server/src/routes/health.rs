use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;

#[derive(Serialize)]
pub struct LivenessResponse {
    status: &'static str,
    timestamp: String,
    version: &'static str,
}

/// Liveness check - is the process running?
/// Returns 200 if the server is alive.
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(LivenessResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Configures the health route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(liveness));
}
