//! Slack Web API client.
//!
//! Posts messages with `chat.postMessage` using a bot token. Slack answers
//! HTTP 200 for most failures, so the `ok` flag in the body decides success.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{ChatClient, ChatMessage};
use crate::config::SlackConfig;
use crate::error::{AppError, AppResult};

/// Slack Web API client
pub struct SlackClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackClient {
    /// Creates a client for the configured workspace
    pub fn new(config: &SlackConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Maps Slack error codes to readable messages
    fn describe_error(code: &str) -> String {
        match code {
            "channel_not_found" => "Slack channel not found".to_string(),
            "not_in_channel" => "Bot is not a member of the Slack channel".to_string(),
            "is_archived" => "Slack channel is archived".to_string(),
            "invalid_auth" | "not_authed" => "Invalid Slack token".to_string(),
            "ratelimited" => "Slack rate limit reached".to_string(),
            other => format!("Slack API error: {}", other),
        }
    }
}

#[async_trait]
impl ChatClient for SlackClient {
    async fn post_message(&self, message: &ChatMessage) -> AppResult<()> {
        let response = self
            .client
            .post(self.endpoint("chat.postMessage"))
            .bearer_auth(&self.token)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "Request to Slack timed out".to_string()
                } else if e.is_connect() {
                    "Connection to Slack failed".to_string()
                } else {
                    format!("Slack request failed: {}", e)
                };
                AppError::Dispatch(reason)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Dispatch(format!(
                "Slack API error: HTTP {}",
                status.as_u16()
            )));
        }

        let body: SlackResponse = response
            .json()
            .await
            .map_err(|e| AppError::Dispatch(format!("Invalid Slack response: {}", e)))?;

        if body.ok {
            Ok(())
        } else {
            let code = body.error.unwrap_or_else(|| "unknown_error".to_string());
            Err(AppError::Dispatch(Self::describe_error(&code)))
        }
    }
}
