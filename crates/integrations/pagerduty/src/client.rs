use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ApiVersion;
use crate::error::PagerDutyError;
use crate::transport::Transport;
use crate::types::{PagerDutyMessage, PagerDutyResponse};

/// Base URL of the public `PagerDuty` events endpoints.
pub const DEFAULT_API_BASE_URL: &str = "https://events.pagerduty.com";

/// Posts trigger messages to `PagerDuty` and interprets the response.
///
/// One call is one attempt: nothing is retried, queued or batched.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    api_base_url: String,
}

impl Default for HttpDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDispatcher {
    pub fn new() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
        }
    }

    /// Override the API base URL (useful for testing against a mock server).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Full URL of the trigger endpoint for an API generation.
    pub fn endpoint(&self, version: ApiVersion) -> Result<Url, PagerDutyError> {
        let raw = format!(
            "{}{}",
            self.api_base_url.trim_end_matches('/'),
            version.endpoint_path()
        );
        Url::parse(&raw).map_err(|e| PagerDutyError::InvalidEndpoint {
            url: raw,
            reason: e.to_string(),
        })
    }

    /// Send one trigger message and check the response.
    ///
    /// The response body is decoded whatever the HTTP status, because
    /// `PagerDuty` explains rejections in the body. Success follows the
    /// generation's rule (see [`PagerDutyResponse::check`]).
    #[instrument(skip_all, fields(api_version = %message.api_version()))]
    pub async fn trigger<T: Transport>(
        &self,
        transport: &T,
        message: &PagerDutyMessage,
    ) -> Result<PagerDutyResponse, PagerDutyError> {
        let version = message.api_version();
        let url = self.endpoint(version)?;
        let body =
            serde_json::to_vec(message).map_err(|e| PagerDutyError::Serialize(e.to_string()))?;

        debug!(
            endpoint = %url,
            dedup_key = %message.dedup_key(),
            links = message.links().len(),
            bytes = body.len(),
            "triggering event in PagerDuty"
        );

        let raw = transport.post_json(&url, body).await?;
        let response: PagerDutyResponse = serde_json::from_slice(&raw.body)
            .map_err(|e| PagerDutyError::Decode(format!("HTTP {}: {e}", raw.status)))?;

        if let Err(e) = response.check(version) {
            warn!(
                status = raw.status,
                response_message = response.message.as_deref().unwrap_or_default(),
                errors = ?response.error_list(),
                "PagerDuty rejected the event"
            );
            return Err(e);
        }

        if !raw.is_success() {
            warn!(
                status = raw.status,
                "PagerDuty answered with a non-2xx status but reported no errors"
            );
        }
        debug!(
            incident_key = response.incident_key().unwrap_or_default(),
            "event sent to PagerDuty"
        );
        Ok(response)
    }
}
