use thiserror::Error;

/// Failure of a single notification attempt, as reported to the host.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The stored notification configuration could not be used.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The outgoing message could not be built from the alert.
    #[error("failed to build notification: {0}")]
    Build(String),

    /// The remote endpoint could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// Writing the request or reading the response failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote service accepted the request but reported a failure.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Releasing the client after the attempt failed.
    #[error("failed to release client: {0}")]
    Release(String),

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl NotifyError {
    /// Returns `true` if the failure is transient and the host may try
    /// again later. Notifiers never retry on their own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(NotifyError::Connection("refused".into()).is_retryable());
        assert!(NotifyError::Transport("reset".into()).is_retryable());
    }

    #[test]
    fn non_retryable_errors() {
        assert!(!NotifyError::Configuration("x".into()).is_retryable());
        assert!(!NotifyError::Build("x".into()).is_retryable());
        assert!(!NotifyError::Delivery("x".into()).is_retryable());
        assert!(!NotifyError::Release("x".into()).is_retryable());
        assert!(!NotifyError::Serialization("x".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = NotifyError::Delivery("details: [bad key]".into());
        assert_eq!(err.to_string(), "delivery failed: details: [bad key]");

        let err = NotifyError::Configuration("missing routing_key".into());
        assert_eq!(err.to_string(), "invalid configuration: missing routing_key");
    }
}
