//! Slack Block Kit rendering for build, error and test messages.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::{BuildMetadata, Platform};

/// Longest context dump placed in an error message
pub const MAX_CONTEXT_CHARS: usize = 2900;

/// Body of a `chat.postMessage` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub channel: String,
    /// Plain-text fallback shown in notifications
    pub text: String,
    pub blocks: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unfurl_links: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unfurl_media: Option<bool>,
}

impl ChatMessage {
    /// Block types in order, handy for assertions and logs
    pub fn block_types(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| b["type"].as_str())
            .collect()
    }
}

fn platform_emoji(platform: Platform) -> &'static str {
    match platform {
        Platform::Ios => "🍎",
        Platform::Android => "🤖",
    }
}

fn installation_instructions(platform: Platform) -> &'static str {
    match platform {
        Platform::Ios => {
            "📱 *iOS Installation:* Open the link on your iOS device and follow the installation prompts. You may need to trust the developer certificate in Settings > General > VPN & Device Management."
        }
        Platform::Android => {
            "📱 *Android Installation:* Download the APK and enable \"Install from Unknown Sources\" in your device settings if prompted."
        }
    }
}

/// Renders an RFC 3339 timestamp as `YYYY-MM-DD HH:MM UTC`, anything else verbatim
pub fn format_release_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => date
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M UTC")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Escapes special Slack markdown characters
pub fn escape_markdown(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Cuts `text` to at most `max` characters, marking the cut
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

/// Formats a new build announcement
pub fn build_message(channel: &str, build: &BuildMetadata) -> ChatMessage {
    let platform = build.platform.label();

    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("{} New {} Build Available", platform_emoji(build.platform), platform),
                "emoji": true
            }
        }),
        json!({
            "type": "section",
            "fields": [
                { "type": "mrkdwn", "text": format!("*App:* {}", build.app_name) },
                { "type": "mrkdwn", "text": format!("*Version:* {} ({})", build.version, build.build_number) },
                { "type": "mrkdwn", "text": format!("*Platform:* {}", platform) },
                { "type": "mrkdwn", "text": format!("*Release Date:* {}", format_release_date(&build.release_date)) }
            ]
        }),
    ];

    if let Some(notes) = build.release_notes.as_deref() {
        if !notes.trim().is_empty() {
            blocks.push(json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!("*Release Notes:*\n{}", notes)
                }
            }));
        }
    }

    blocks.push(json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": "*Download the app:*" },
        "accessory": {
            "type": "button",
            "text": { "type": "plain_text", "text": "📱 Download App", "emoji": true },
            "url": build.download_url,
            "action_id": "download_app"
        }
    }));

    blocks.push(json!({
        "type": "context",
        "elements": [
            { "type": "mrkdwn", "text": installation_instructions(build.platform) }
        ]
    }));

    ChatMessage {
        channel: channel.to_string(),
        text: format!("New {} build: {} {}", platform, build.app_name, build.version),
        blocks,
        unfurl_links: Some(false),
        unfurl_media: Some(false),
    }
}

/// Formats an operational error report
pub fn error_message(
    channel: &str,
    error: &str,
    now: DateTime<Utc>,
    context: Option<&Value>,
) -> ChatMessage {
    let title = "🚨 App Distribution Bot Error";

    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": title, "emoji": true }
        }),
        json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*Error:* {}\n*Time:* {}",
                    escape_markdown(error),
                    now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
                )
            }
        }),
    ];

    if let Some(context) = context {
        let pretty = serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_string());
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*Context:*\n```{}```", truncate(&pretty, MAX_CONTEXT_CHARS))
            }
        }));
    }

    ChatMessage {
        channel: channel.to_string(),
        text: title.to_string(),
        blocks,
        unfurl_links: None,
        unfurl_media: None,
    }
}

/// Fixed message confirming the bot can reach the channel
pub fn test_message(channel: &str) -> ChatMessage {
    ChatMessage {
        channel: channel.to_string(),
        text: "🧪 Test notification from App Distribution Bot".to_string(),
        blocks: vec![json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": "🧪 *Test Notification*\n\nApp Distribution Bot is working correctly!"
            }
        })],
        unfurl_links: None,
        unfurl_media: None,
    }
}
