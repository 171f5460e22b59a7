use pagerlog_notifier::NotifyError;
use thiserror::Error;

/// Prefix of host-facing messages for transport and release failures.
const EXCEPTION_PREFIX: &str = "There was an exception triggering the PagerDuty event";

/// Errors specific to the `PagerDuty` notifier.
///
/// These are internal errors that get converted into [`NotifyError`] at the
/// notifier boundary.
#[derive(Debug, Error)]
pub enum PagerDutyError {
    /// The stored notification config could not be deserialized.
    #[error("invalid notification config: {0}")]
    InvalidConfig(String),

    /// The client URL is not an absolute `http`/`https` URL, found while
    /// building deep links.
    #[error("malformed client URL '{url}': {reason}")]
    MalformedClientUrl { url: String, reason: String },

    /// The event could not be serialized to JSON.
    #[error("failed to serialize event: {0}")]
    Serialize(String),

    /// The `PagerDuty` endpoint URL is not a valid URL.
    #[error("malformed URL for PagerDuty API '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// No connection to `PagerDuty` could be opened.
    #[error("error while opening connection to PagerDuty API: {0}")]
    Connection(String),

    /// Writing the request or reading the response failed.
    #[error("could not POST event trigger to PagerDuty API: {0}")]
    Transport(String),

    /// The response body is not a `PagerDuty` response.
    #[error("invalid PagerDuty response: {0}")]
    Decode(String),

    /// The legacy API answered with a status other than `"success"`.
    #[error("Error while creating event at PagerDuty: {message}")]
    Rejected { status: String, message: String },

    /// The v2 API reported errors in its response body.
    #[error("There was an error triggering the PagerDuty event, details: [{}]", .0.join(", "))]
    Reported(Vec<String>),

    /// Closing the HTTP client after the attempt failed.
    #[error("failed to close PagerDuty client: {0}")]
    Release(String),
}

impl From<reqwest::Error> for PagerDutyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<PagerDutyError> for NotifyError {
    fn from(err: PagerDutyError) -> Self {
        match err {
            PagerDutyError::InvalidConfig(_) | PagerDutyError::InvalidEndpoint { .. } => {
                NotifyError::Configuration(err.to_string())
            }
            PagerDutyError::MalformedClientUrl { .. } => NotifyError::Build(err.to_string()),
            PagerDutyError::Serialize(msg) => NotifyError::Serialization(msg),
            PagerDutyError::Connection(_) => {
                NotifyError::Connection(format!("{EXCEPTION_PREFIX}: {err}"))
            }
            PagerDutyError::Transport(_) | PagerDutyError::Decode(_) => {
                NotifyError::Transport(format!("{EXCEPTION_PREFIX}: {err}"))
            }
            PagerDutyError::Rejected { .. } | PagerDutyError::Reported(_) => {
                NotifyError::Delivery(err.to_string())
            }
            PagerDutyError::Release(_) => NotifyError::Release(format!("{EXCEPTION_PREFIX}: {err}")),
        }
    }
}
