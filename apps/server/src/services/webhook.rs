//! Webhook dispatch: validate → filter → extract → notify.
//!
//! Malformed and irrelevant events are acknowledged and dropped. Extraction
//! and delivery failures are reported to the channel on a best-effort basis
//! and then returned to the HTTP layer. Nothing is retried.

use std::sync::Arc;

use serde_json::{json, Value};

use super::notification::message::truncate;
use super::{DistributionService, Notifier};
use crate::clock::Clock;
use crate::error::AppResult;
use crate::models::{BuildMetadata, EventRejection, InboundEvent, Platform};

/// Longest slice of the event body attached to an error report
const EVENT_CONTEXT_CHARS: usize = 500;

/// What happened to an acknowledged webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Notified { release_id: String, platform: Platform },
    /// Body did not have the minimal event shape
    Invalid(EventRejection),
    /// Recognised event type that does not produce notifications
    Ignored { event_type: String },
}

/// Where a manual test notification got its data from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestSource {
    Release,
    Sample,
}

pub struct WebhookHandler {
    distribution: DistributionService,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl WebhookHandler {
    pub fn new(distribution: DistributionService, notifier: Notifier, clock: Arc<dyn Clock>) -> Self {
        Self {
            distribution,
            notifier,
            clock,
        }
    }

    /// Processes one inbound distribution webhook body
    pub async fn handle_app_distribution_event(&self, body: &Value) -> AppResult<EventOutcome> {
        let event = match InboundEvent::parse(body) {
            Ok(InboundEvent::Release(event)) => event,
            Ok(InboundEvent::Other { event_type }) => {
                log::debug!("Ignoring non-release event {}", event_type);
                return Ok(EventOutcome::Ignored { event_type });
            }
            Err(rejection) => {
                log::warn!("Invalid webhook event structure: {}", rejection);
                log::debug!("Rejected webhook body: {}", body);
                return Ok(EventOutcome::Invalid(rejection));
            }
        };

        log::info!(
            "Processing App Distribution webhook: event={} release={} app={} platform={}",
            event.kind.as_str(),
            event.release.release_id,
            event.app.display_name,
            event.app.platform
        );

        let result = async {
            let metadata = self.distribution.extract_metadata(&event).await?;
            self.notifier.send_build_notification(&metadata).await
        }
        .await;

        if let Err(e) = result {
            log::error!(
                "Error processing webhook event for release {}: {}",
                event.release.release_id,
                e
            );
            let _ = self
                .notifier
                .send_error_notification(&e, Some(&Self::event_context(body)))
                .await;
            return Err(e);
        }

        log::info!(
            "Successfully processed webhook event for release {} ({})",
            event.release.release_id,
            event.app.platform
        );
        Ok(EventOutcome::Notified {
            release_id: event.release.release_id,
            platform: event.app.platform,
        })
    }

    /// Sends a build notification for a release on demand.
    ///
    /// Falls back to a fixed sample build when the platform has no metadata.
    pub async fn handle_test_notification(
        &self,
        release_id: &str,
        platform: Platform,
    ) -> AppResult<TestSource> {
        log::info!(
            "Processing test notification: release={} platform={}",
            release_id,
            platform
        );

        let (metadata, source) = match self.distribution.release_metadata(release_id).await {
            Some(metadata) => (metadata, TestSource::Release),
            None => (
                BuildMetadata::sample(platform, self.clock.now()),
                TestSource::Sample,
            ),
        };

        if let Err(e) = self.notifier.send_build_notification(&metadata).await {
            log::error!(
                "Error processing test notification for release {}: {}",
                release_id,
                e
            );
            let context = json!({
                "test": true,
                "releaseId": release_id,
                "platform": platform,
            });
            let _ = self
                .notifier
                .send_error_notification(&e, Some(&context))
                .await;
            return Err(e);
        }

        log::info!("Sent test notification with {:?} data", source);
        Ok(source)
    }

    /// Posts the static health-check message
    pub async fn send_health_check(&self) -> AppResult<()> {
        self.notifier.send_test_notification().await.map_err(|e| {
            log::error!("Health check notification failed: {}", e);
            e
        })
    }

    fn event_context(body: &Value) -> Value {
        let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
        json!({
            "webhook": "app_distribution",
            "eventData": truncate(&pretty, EVENT_CONTEXT_CHARS),
        })
    }
}
