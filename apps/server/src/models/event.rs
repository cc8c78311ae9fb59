//! Inbound webhook events from the distribution platform.
//!
//! Bodies arrive as untyped JSON. [`InboundEvent::parse`] is the single
//! place where they become typed: it either yields a recognised event or an
//! [`EventRejection`] describing why the body was not usable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const RELEASE_CREATED: &str = "appDistribution.release.created";
pub const RELEASE_UPDATED: &str = "appDistribution.release.updated";

/// Target platform of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }

    /// Upper-case name used in message text
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Android => "ANDROID",
            Platform::Ios => "IOS",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = EventRejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            other => Err(EventRejection::UnsupportedPlatform(other.to_string())),
        }
    }
}

/// Release lifecycle events that produce a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseEventKind {
    Created,
    Updated,
}

impl ReleaseEventKind {
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            RELEASE_CREATED => Some(ReleaseEventKind::Created),
            RELEASE_UPDATED => Some(ReleaseEventKind::Updated),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseEventKind::Created => RELEASE_CREATED,
            ReleaseEventKind::Updated => RELEASE_UPDATED,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    #[serde(deserialize_with = "lenient_string")]
    pub release_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub create_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub display_version: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub build_version: String,
    #[serde(default)]
    pub release_notes: Option<ReleaseNotes>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub firebase_app_id: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseNotes {
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub app_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub display_name: String,
    pub platform: Platform,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub bundle_id: Option<String>,
}

/// Scalar as text; `null` reads as empty.
///
/// Ids and version strings are sometimes sent as numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, found {}",
            other
        ))),
    }
}

/// A release created/updated event
#[derive(Debug, Clone)]
pub struct ReleaseEvent {
    pub kind: ReleaseEventKind,
    pub release: Release,
    pub app: AppInfo,
}

impl ReleaseEvent {
    /// Release notes text, if any was attached
    pub fn notes(&self) -> Option<&str> {
        self.release.release_notes.as_ref().map(|n| n.text.as_str())
    }
}

/// Structurally valid inbound event
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Release(ReleaseEvent),
    /// Any other event type; acknowledged and dropped
    Other { event_type: String },
}

/// Why an inbound body could not be turned into an event
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventRejection {
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("missing eventType")]
    MissingEventType,
    #[error("missing data.release")]
    MissingRelease,
    #[error("missing data.release.releaseId")]
    MissingReleaseId,
    #[error("missing data.app")]
    MissingApp,
    #[error("missing data.app.platform")]
    MissingPlatform,
    #[error("unsupported platform '{0}'")]
    UnsupportedPlatform(String),
    #[error("malformed event: {0}")]
    Malformed(String),
}

/// Present and not null, false, zero or empty
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

/// Checks the minimal shape every event must have.
///
/// Requires `eventType`, `data.release.releaseId` and `data.app.platform`.
pub fn validate_shape(body: &Value) -> Result<(), EventRejection> {
    let obj = body.as_object().ok_or(EventRejection::NotAnObject)?;

    if !is_present(obj.get("eventType")) {
        return Err(EventRejection::MissingEventType);
    }

    let data = obj.get("data");
    let release = data.and_then(|d| d.get("release"));
    let app = data.and_then(|d| d.get("app"));

    if !is_present(release) {
        return Err(EventRejection::MissingRelease);
    }
    if !is_present(app) {
        return Err(EventRejection::MissingApp);
    }
    if !is_present(release.and_then(|r| r.get("releaseId"))) {
        return Err(EventRejection::MissingReleaseId);
    }
    if !is_present(app.and_then(|a| a.get("platform"))) {
        return Err(EventRejection::MissingPlatform);
    }

    Ok(())
}

/// Boolean form of [`validate_shape`]
pub fn is_valid_event(body: &Value) -> bool {
    validate_shape(body).is_ok()
}

impl InboundEvent {
    /// Validates and types an inbound body
    pub fn parse(body: &Value) -> Result<Self, EventRejection> {
        validate_shape(body)?;

        let event_type = match &body["eventType"] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        let Some(kind) = ReleaseEventKind::from_event_type(&event_type) else {
            return Ok(InboundEvent::Other { event_type });
        };

        let data = &body["data"];
        match &data["app"]["platform"] {
            Value::String(p) => {
                p.parse::<Platform>()?;
            }
            other => return Err(EventRejection::UnsupportedPlatform(other.to_string())),
        }

        let release: Release = serde_json::from_value(data["release"].clone())
            .map_err(|e| EventRejection::Malformed(format!("data.release: {}", e)))?;
        let app: AppInfo = serde_json::from_value(data["app"].clone())
            .map_err(|e| EventRejection::Malformed(format!("data.app: {}", e)))?;

        Ok(InboundEvent::Release(ReleaseEvent { kind, release, app }))
    }

    pub fn event_type(&self) -> &str {
        match self {
            InboundEvent::Release(event) => event.kind.as_str(),
            InboundEvent::Other { event_type } => event_type,
        }
    }
}
