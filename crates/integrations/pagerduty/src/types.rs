use serde::{Deserialize, Serialize};

use crate::config::ApiVersion;
use crate::error::PagerDutyError;

/// Urgency attached to a trigger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    /// Map an event definition priority to a severity.
    ///
    /// 3 is critical, 2 is warning; anything else, including negative and
    /// out-of-range values, is info.
    pub fn from_priority(priority: i64) -> Self {
        match priority {
            3 => Self::Critical,
            2 => Self::Warning,
            _ => Self::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// A link to display in the `PagerDuty` incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// The URL of the link.
    pub href: String,
    /// Text to display for the link.
    pub text: String,
}

/// Payload section of an Events API v2 trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Brief description of the event.
    pub summary: String,
    pub severity: Severity,
    pub component: String,
    /// Origin of the event, `Graylog:[<stream ids>]`.
    pub source: String,
    pub class: String,
    /// Event time, RFC 3339 with offset.
    pub timestamp: String,
    /// Stream id list the event came from.
    pub group: String,
}

/// Request body for the Events API v2 enqueue endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueueEvent {
    pub routing_key: String,
    /// Always `"trigger"`.
    pub event_action: String,
    /// Deduplication key; empty when custom keys are disabled.
    pub dedup_key: String,
    pub client: String,
    pub client_url: String,
    pub payload: EventPayload,
    pub links: Vec<Link>,
}

/// A link entry in the legacy `contexts` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkContext {
    /// Always `"link"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub href: String,
    pub text: String,
}

impl From<Link> for LinkContext {
    fn from(link: Link) -> Self {
        Self {
            kind: "link".into(),
            href: link.href,
            text: link.text,
        }
    }
}

/// Free-form `details` of a legacy trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericDetails {
    pub stream_ids: String,
    pub stream_titles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    pub severity: Severity,
    pub timestamp: String,
}

/// Request body for the legacy generic events endpoint.
///
/// Empty optional fields are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericEvent {
    pub service_key: String,
    /// Always `"trigger"`.
    pub event_type: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub incident_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_url: String,
    pub details: GenericDetails,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<LinkContext>,
}

/// A trigger message in one of the two payload generations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PagerDutyMessage {
    V1(GenericEvent),
    V2(EnqueueEvent),
}

impl PagerDutyMessage {
    pub fn api_version(&self) -> ApiVersion {
        match self {
            Self::V1(_) => ApiVersion::V1,
            Self::V2(_) => ApiVersion::V2,
        }
    }

    /// The deduplication (incident) key carried by the message.
    pub fn dedup_key(&self) -> &str {
        match self {
            Self::V1(event) => &event.incident_key,
            Self::V2(event) => &event.dedup_key,
        }
    }

    pub fn links(&self) -> Vec<&str> {
        match self {
            Self::V1(event) => event.contexts.iter().map(|c| c.href.as_str()).collect(),
            Self::V2(event) => event.links.iter().map(|l| l.href.as_str()).collect(),
        }
    }
}

/// Response from either `PagerDuty` events endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PagerDutyResponse {
    /// `"success"` when the event was accepted.
    #[serde(default)]
    pub status: Option<String>,

    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,

    /// Incident key, as named by the legacy API.
    #[serde(default)]
    pub incident_key: Option<String>,

    /// Deduplication key, as named by the v2 API.
    #[serde(default)]
    pub dedup_key: Option<String>,

    /// Problems with the event, if any.
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

impl PagerDutyResponse {
    /// Key `PagerDuty` assigned to the incident, under either field name.
    pub fn incident_key(&self) -> Option<&str> {
        self.incident_key.as_deref().or(self.dedup_key.as_deref())
    }

    pub fn error_list(&self) -> &[String] {
        self.errors.as_deref().unwrap_or_default()
    }

    /// Apply the success rule of the given API generation.
    ///
    /// The legacy API succeeds only with status `"success"`; v2 succeeds
    /// whenever the `errors` list is absent or empty.
    pub fn check(&self, version: ApiVersion) -> Result<(), PagerDutyError> {
        match version {
            ApiVersion::V1 if self.status.as_deref() == Some("success") => Ok(()),
            ApiVersion::V1 => Err(PagerDutyError::Rejected {
                status: self.status.clone().unwrap_or_default(),
                message: self.message.clone().unwrap_or_default(),
            }),
            ApiVersion::V2 if self.error_list().is_empty() => Ok(()),
            ApiVersion::V2 => Err(PagerDutyError::Reported(self.error_list().to_vec())),
        }
    }
}
