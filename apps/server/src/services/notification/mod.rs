//! Chat notifications.
//!
//! [`Notifier`] renders the three message kinds and hands them to a
//! [`ChatClient`], the single "post to channel" primitive. The production
//! client talks to the Slack Web API; tests substitute a recording fake.

pub mod message;
pub mod slack;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::BestEffort;
use crate::clock::Clock;
use crate::error::AppResult;
use crate::models::BuildMetadata;

pub use message::ChatMessage;
pub use slack::SlackClient;

/// Posts a rendered message to a chat channel
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn post_message(&self, message: &ChatMessage) -> AppResult<()>;
}

/// Renders and dispatches notifications to the configured channel
pub struct Notifier {
    client: Arc<dyn ChatClient>,
    channel: String,
    clock: Arc<dyn Clock>,
}

impl Notifier {
    pub fn new(client: Arc<dyn ChatClient>, channel: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            channel: channel.into(),
            clock,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Announces a new build. Delivery failures propagate.
    pub async fn send_build_notification(&self, build: &BuildMetadata) -> AppResult<()> {
        let message = message::build_message(&self.channel, build);

        if let Err(e) = self.client.post_message(&message).await {
            log::error!(
                "Failed to send build notification for {} {} ({}): {}",
                build.app_name,
                build.version,
                build.platform,
                e
            );
            return Err(e);
        }

        log::info!(
            "Sent build notification: platform={} app={} version={}",
            build.platform,
            build.app_name,
            build.version
        );
        Ok(())
    }

    /// Reports an operational error. Never fails; a delivery error is only logged.
    pub async fn send_error_notification(
        &self,
        error: &dyn fmt::Display,
        context: Option<&Value>,
    ) -> BestEffort {
        let message =
            message::error_message(&self.channel, &error.to_string(), self.clock.now(), context);

        match self.client.post_message(&message).await {
            Ok(()) => BestEffort::Done,
            Err(e) => {
                log::error!("Failed to send error notification to Slack: {}", e);
                BestEffort::Failed(e.to_string())
            }
        }
    }

    /// Posts the static health-check message. Delivery failures propagate.
    pub async fn send_test_notification(&self) -> AppResult<()> {
        self.client
            .post_message(&message::test_message(&self.channel))
            .await?;
        log::info!("Sent test notification to {}", self.channel);
        Ok(())
    }
}
