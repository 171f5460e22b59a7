use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PagerDutyError;

/// Attribute value shown instead of the routing key.
const MASKED: &str = "****";

/// Key prefix a legacy config gets when it does not set one.
pub const LEGACY_KEY_PREFIX: &str = "Graylog/";

/// Client name a legacy config gets when it does not set one.
pub const LEGACY_CLIENT_NAME: &str = "Graylog";

/// Which `PagerDuty` events API, and therefore which payload shape, to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// Legacy generic events API (`service_key` / `incident_key`).
    V1,
    /// Events API v2 enqueue endpoint (`routing_key` / `dedup_key`).
    #[default]
    V2,
}

impl ApiVersion {
    /// Path of the trigger endpoint, relative to the API base URL.
    pub fn endpoint_path(self) -> &'static str {
        match self {
            Self::V1 => "/generic/2010-04-15/create_event.json",
            Self::V2 => "/v2/enqueue",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_custom_incident() -> bool {
    true
}

/// User-entered settings of a `PagerDuty` notification.
///
/// Built with [`NotificationConfig::builder`] or deserialized from the host's
/// stored config, and immutable afterwards. Nothing is checked on
/// construction; call [`validate`](Self::validate) when the user saves.
///
/// Deserialization also accepts the legacy field names `service_key`,
/// `use_custom_incident_key`, `incident_key_prefix` and `client`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default, alias = "service_key")]
    routing_key: String,

    #[serde(default = "default_custom_incident", alias = "use_custom_incident_key")]
    custom_incident: bool,

    #[serde(default, alias = "incident_key_prefix")]
    key_prefix: String,

    #[serde(default, alias = "client")]
    client_name: String,

    #[serde(default)]
    client_url: String,

    #[serde(default)]
    api_version: ApiVersion,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            routing_key: String::new(),
            custom_incident: default_custom_incident(),
            key_prefix: String::new(),
            client_name: String::new(),
            client_url: String::new(),
            api_version: ApiVersion::default(),
        }
    }
}

impl NotificationConfig {
    pub fn builder() -> NotificationConfigBuilder {
        NotificationConfigBuilder::default()
    }

    /// Parse the raw config the host stored for a notification.
    ///
    /// A legacy (v1) config that leaves out the key prefix or the client
    /// name gets [`LEGACY_KEY_PREFIX`] and [`LEGACY_CLIENT_NAME`]. Fields
    /// that are present, even empty, are kept as stored.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, PagerDutyError> {
        let mut config =
            Self::deserialize(value).map_err(|e| PagerDutyError::InvalidConfig(e.to_string()))?;

        if config.api_version == ApiVersion::V1 {
            let has_any = |names: &[&str]| names.iter().any(|name| value.get(*name).is_some());
            if !has_any(&["key_prefix", "incident_key_prefix"]) {
                LEGACY_KEY_PREFIX.clone_into(&mut config.key_prefix);
            }
            if !has_any(&["client_name", "client"]) {
                LEGACY_CLIENT_NAME.clone_into(&mut config.client_name);
            }
        }
        Ok(config)
    }

    /// Integration routing key (the service key of the legacy API).
    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    /// Whether a deduplication key is generated from the event.
    pub fn custom_incident(&self) -> bool {
        self.custom_incident
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// Base URL of the host UI; deep links are built below it.
    pub fn client_url(&self) -> &str {
        &self.client_url
    }

    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// The configuration as a field map, with the routing key masked.
    pub fn attributes(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut attributes = serde_json::Map::new();
        attributes.insert("routing_key".into(), MASKED.into());
        attributes.insert("custom_incident".into(), self.custom_incident.into());
        attributes.insert("key_prefix".into(), self.key_prefix.clone().into());
        attributes.insert("client_name".into(), self.client_name.clone().into());
        attributes.insert("client_url".into(), self.client_url.clone().into());
        attributes.insert("api_version".into(), self.api_version.as_str().into());
        attributes
    }
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("routing_key", &"[REDACTED]")
            .field("custom_incident", &self.custom_incident)
            .field("key_prefix", &self.key_prefix)
            .field("client_name", &self.client_name)
            .field("client_url", &self.client_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Builder for [`NotificationConfig`].
#[derive(Default)]
pub struct NotificationConfigBuilder {
    config: NotificationConfig,
}

impl NotificationConfigBuilder {
    #[must_use]
    pub fn routing_key(mut self, routing_key: impl Into<String>) -> Self {
        self.config.routing_key = routing_key.into();
        self
    }

    #[must_use]
    pub fn custom_incident(mut self, enabled: bool) -> Self {
        self.config.custom_incident = enabled;
        self
    }

    #[must_use]
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.config.client_name = name.into();
        self
    }

    #[must_use]
    pub fn client_url(mut self, url: impl Into<String>) -> Self {
        self.config.client_url = url.into();
        self
    }

    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.config.api_version = version;
        self
    }

    pub fn build(self) -> NotificationConfig {
        self.config
    }
}
