use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::Platform;
use crate::services::WebhookHandler;

use super::webhook::{WebhookResponse, MAX_BODY_BYTES};

/// Manual trigger body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestNotificationRequest {
    #[serde(default)]
    pub release_id: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

fn failure(error: &AppError, summary: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": summary,
        "message": error.to_string(),
    }))
}

/// POST /test/notification
/// Sends a build notification for a release, or a sample build
pub async fn test_notification(
    handler: web::Data<WebhookHandler>,
    body: web::Json<TestNotificationRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    let (Some(release_id), Some(platform)) = (non_empty(body.release_id), non_empty(body.platform))
    else {
        return Err(AppError::Validation(
            "Missing required fields: releaseId, platform".to_string(),
        ));
    };

    let platform: Platform = platform
        .parse()
        .map_err(|e| AppError::Validation(format!("{}", e)))?;

    match handler.handle_test_notification(&release_id, platform).await {
        Ok(_) => Ok(HttpResponse::Ok().json(WebhookResponse { success: true })),
        Err(e) => {
            log::error!("Error in test notification: {}", e);
            Ok(failure(&e, "Failed to send test notification"))
        }
    }
}

/// POST /test/health-check
/// Posts the static test message to the channel
pub async fn health_check(handler: web::Data<WebhookHandler>) -> AppResult<HttpResponse> {
    match handler.send_health_check().await {
        Ok(()) => Ok(HttpResponse::Ok().json(WebhookResponse { success: true })),
        Err(e) => Ok(failure(&e, "Failed to send health check notification")),
    }
}

/// JSON bodies share the webhook size limit; extractor failures use the API error body
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req| {
            log::warn!("Rejected test notification body: {}", err);
            AppError::Validation(err.to_string()).into()
        })
}

/// Configures the manual test routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/test")
            .app_data(json_config())
            .route("/notification", web::post().to(test_notification))
            .route("/health-check", web::post().to(health_check)),
    );
}
