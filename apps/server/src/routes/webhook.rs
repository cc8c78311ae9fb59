use actix_web::{web, HttpRequest, HttpResponse};
use bytes::Bytes;
use serde_json::Value;

use crate::auth::SignatureGate;
use crate::error::AppResult;
use crate::middleware::RateLimit;
use crate::services::{EventOutcome, WebhookHandler};

/// Largest accepted webhook body
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(serde::Serialize)]
pub struct WebhookResponse {
    pub success: bool,
}

/// POST /webhook/app-distribution
/// Receives release events from the distribution platform
pub async fn app_distribution(
    gate: web::Data<SignatureGate>,
    handler: web::Data<WebhookHandler>,
    req: HttpRequest,
    body: Bytes,
) -> AppResult<HttpResponse> {
    gate.check(req.headers(), &body)?;

    log::info!("Received App Distribution webhook ({} bytes)", body.len());

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            // Acknowledged so the sender does not retry
            log::warn!("Webhook body is not valid JSON: {}", e);
            return Ok(HttpResponse::Ok().json(WebhookResponse { success: true }));
        }
    };

    match handler.handle_app_distribution_event(&payload).await? {
        EventOutcome::Notified { release_id, .. } => {
            log::debug!("Webhook for release {} delivered", release_id)
        }
        EventOutcome::Invalid(_) | EventOutcome::Ignored { .. } => {}
    }

    Ok(HttpResponse::Ok().json(WebhookResponse { success: true }))
}

/// Configures the webhook routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/webhook")
            .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
            .wrap(RateLimit)
            .route("/app-distribution", web::post().to(app_distribution)),
    );
}
