use std::sync::Arc;

use pagerlog_core::{NotificationContext, StreamLookup};
use pagerlog_notifier::{Notifier, NotifyError};
use tracing::{debug, instrument, warn};

use crate::client::HttpDispatcher;
use crate::config::NotificationConfig;
use crate::error::PagerDutyError;
use crate::message::MessageBuilder;
use crate::transport::{ReqwestTransportFactory, ScopedTransport, TransportFactory};
use crate::types::PagerDutyResponse;

/// `PagerDuty` notifier invoked by the host once per alert.
///
/// Each call reads the notification's config, resolves the event's source
/// streams, builds the trigger message, and dispatches it over a transport
/// that lives for exactly that call. The call either fully succeeds or
/// returns a [`NotifyError`].
pub struct PagerDutyNotifier<F = ReqwestTransportFactory> {
    streams: Arc<dyn StreamLookup>,
    factory: F,
    dispatcher: HttpDispatcher,
}

impl PagerDutyNotifier {
    /// Create a notifier that opens a new `reqwest` client for every alert.
    pub fn new(streams: Arc<dyn StreamLookup>) -> Self {
        Self {
            streams,
            factory: ReqwestTransportFactory::new(),
            dispatcher: HttpDispatcher::new(),
        }
    }
}

impl<F: TransportFactory> PagerDutyNotifier<F> {
    /// Swap the transport factory, e.g. to share one connection pool or to
    /// plug in a fake transport.
    pub fn with_transport_factory<G: TransportFactory>(self, factory: G) -> PagerDutyNotifier<G> {
        PagerDutyNotifier {
            streams: self.streams,
            factory,
            dispatcher: self.dispatcher,
        }
    }

    /// Override the API base URL (useful for testing against a mock server).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.dispatcher = self.dispatcher.with_api_base_url(url);
        self
    }

    async fn trigger(&self, ctx: &NotificationContext) -> Result<PagerDutyResponse, PagerDutyError> {
        let config = NotificationConfig::from_value(&ctx.notification_config)?;
        let streams = self.streams.load_by_ids(&ctx.event.source_streams);
        let message = MessageBuilder::new(&config).build(ctx, &streams)?;

        let transport = ScopedTransport::acquire(&self.factory)?;
        let outcome = self.dispatcher.trigger(transport.get(), &message).await;
        let released = transport.release();

        if let (Err(trigger_err), Err(release_err)) = (&outcome, &released) {
            warn!(
                error = %release_err,
                cause = %trigger_err,
                "failed to close PagerDuty transport after a failed trigger"
            );
        }

        let response = outcome?;
        released?;
        Ok(response)
    }
}

impl<F: TransportFactory> Notifier for PagerDutyNotifier<F> {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "pagerduty"
    }

    #[instrument(
        skip(self, ctx),
        fields(
            notifier = "pagerduty",
            notification_id = %ctx.notification_id,
            event_id = %ctx.event.id,
        )
    )]
    async fn notify(&self, ctx: &NotificationContext) -> Result<(), NotifyError> {
        match self.trigger(ctx).await {
            Ok(response) => {
                debug!(
                    incident_key = response.incident_key().unwrap_or_default(),
                    "PagerDuty event triggered"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "PagerDuty notification failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::DateTime;
    use pagerlog_core::{Event, EventDefinition, InMemoryStreams, Stream};
    use url::Url;

    use super::*;
    use crate::transport::{RawResponse, Transport};

    /// What the scripted transport answers and what it observed.
    #[derive(Default)]
    struct Script {
        status: u16,
        body: String,
        fail_post: bool,
        fail_close: bool,
        created: usize,
        closed: usize,
        requests: Vec<(String, serde_json::Value)>,
    }

    struct ScriptedTransport {
        script: Arc<Mutex<Script>>,
    }

    impl Transport for ScriptedTransport {
        async fn post_json(&self, url: &Url, body: Vec<u8>) -> Result<RawResponse, PagerDutyError> {
            let mut script = self.script.lock().unwrap();
            script
                .requests
                .push((url.to_string(), serde_json::from_slice(&body).unwrap()));
            if script.fail_post {
                return Err(PagerDutyError::Connection("connection refused".into()));
            }
            Ok(RawResponse {
                status: script.status,
                body: script.body.clone().into_bytes(),
            })
        }

        fn close(&mut self) -> Result<(), PagerDutyError> {
            let mut script = self.script.lock().unwrap();
            script.closed += 1;
            if script.fail_close {
                return Err(PagerDutyError::Release("socket still in use".into()));
            }
            Ok(())
        }
    }

    #[derive(Clone)]
    struct ScriptedFactory {
        script: Arc<Mutex<Script>>,
    }

    impl ScriptedFactory {
        fn answering(status: u16, body: &str) -> Self {
            Self {
                script: Arc::new(Mutex::new(Script {
                    status,
                    body: body.to_owned(),
                    ..Script::default()
                })),
            }
        }

        fn failing_close(self) -> Self {
            self.script.lock().unwrap().fail_close = true;
            self
        }

        fn failing_post(self) -> Self {
            self.script.lock().unwrap().fail_post = true;
            self
        }

        fn created(&self) -> usize {
            self.script.lock().unwrap().created
        }

        fn closed(&self) -> usize {
            self.script.lock().unwrap().closed
        }

        fn requests(&self) -> Vec<(String, serde_json::Value)> {
            self.script.lock().unwrap().requests.clone()
        }
    }

    impl TransportFactory for ScriptedFactory {
        type Transport = ScriptedTransport;

        fn create(&self) -> Result<ScriptedTransport, PagerDutyError> {
            self.script.lock().unwrap().created += 1;
            Ok(ScriptedTransport {
                script: Arc::clone(&self.script),
            })
        }
    }

    fn streams() -> Arc<dyn StreamLookup> {
        Arc::new(
            InMemoryStreams::new()
                .with_stream(Stream::new("0001", "Test Stream Title"))
                .with_stream(Stream::new("0002", "Other Stream")),
        )
    }

    fn notifier(factory: &ScriptedFactory) -> PagerDutyNotifier<ScriptedFactory> {
        PagerDutyNotifier::new(streams()).with_transport_factory(factory.clone())
    }

    fn context(config: serde_json::Value) -> NotificationContext {
        let timestamp = DateTime::parse_from_rfc3339("2024-05-01T10:00:00.250+02:00").unwrap();
        let event = Event::new("event-1", "Disk full on web-1", timestamp)
            .with_source_stream("0001")
            .with_source_stream("9999");
        NotificationContext::new("notification-1", config, event).with_event_definition(
            EventDefinition::new("def-1", "Disk usage", 3).with_query("source:web-1"),
        )
    }

    fn v2_config() -> serde_json::Value {
        serde_json::json!({
            "routing_key": "01234567890123456789012345678901",
            "custom_incident": true,
            "key_prefix": "Graylog",
            "client_name": "Graylog",
            "client_url": "https://graylog.example.com",
        })
    }

    fn v1_config() -> serde_json::Value {
        serde_json::json!({
            "service_key": "01234567890123456789012345678901",
            "use_custom_incident_key": true,
            "incident_key_prefix": "Graylog",
            "client": "Graylog",
            "client_url": "https://graylog.example.com",
            "api_version": "v1",
        })
    }

    #[test]
    fn notifier_name() {
        let factory = ScriptedFactory::answering(202, "{}");
        assert_eq!(Notifier::name(&notifier(&factory)), "pagerduty");
    }

    #[tokio::test]
    async fn v2_empty_errors_succeeds() {
        let factory = ScriptedFactory::answering(202, r#"{"errors":[]}"#);
        notifier(&factory)
            .notify(&context(v2_config()))
            .await
            .unwrap();

        assert_eq!(factory.created(), 1);
        assert_eq!(factory.closed(), 1);

        let requests = factory.requests();
        assert_eq!(requests.len(), 1);
        let (url, body) = &requests[0];
        assert_eq!(url, "https://events.pagerduty.com/v2/enqueue");
        assert_eq!(body["dedup_key"], "Graylog/[0001, 9999]/Disk usage");
        assert_eq!(body["payload"]["severity"], "critical");
        assert_eq!(body["payload"]["timestamp"], "2024-05-01T10:00:00.250+02:00");
        // Unknown stream ids stay in the key but produce no link.
        assert_eq!(body["links"].as_array().unwrap().len(), 1);
        assert_eq!(
            body["links"][0]["href"],
            "https://graylog.example.com/streams/0001/search?q=source:web-1"
        );
        assert_eq!(body["links"][0]["text"], "Test Stream Title");
    }

    #[tokio::test]
    async fn v1_success_status_succeeds() {
        let factory = ScriptedFactory::answering(
            200,
            r#"{"status":"success","message":"Event processed","incident_key":"k1"}"#,
        );
        notifier(&factory)
            .notify(&context(v1_config()))
            .await
            .unwrap();

        let requests = factory.requests();
        let (url, body) = &requests[0];
        assert_eq!(
            url,
            "https://events.pagerduty.com/generic/2010-04-15/create_event.json"
        );
        assert_eq!(body["incident_key"], "Graylog/[0001, 9999]/Disk usage");
        assert_eq!(body["contexts"][0]["type"], "link");
        assert_eq!(factory.closed(), 1);
    }

    #[tokio::test]
    async fn v2_reported_errors_fail_with_details() {
        let factory = ScriptedFactory::answering(400, r#"{"errors":["x"]}"#);
        let err = notifier(&factory)
            .notify(&context(v2_config()))
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::Delivery(_)));
        assert!(
            err.to_string()
                .contains("There was an error triggering the PagerDuty event, details: [x]")
        );
        assert_eq!(factory.closed(), 1);
    }

    #[tokio::test]
    async fn v1_failure_status_fails_with_message() {
        let factory = ScriptedFactory::answering(200, r#"{"status":"failure","message":"x"}"#);
        let err = notifier(&factory)
            .notify(&context(v1_config()))
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::Delivery(_)));
        assert!(
            err.to_string()
                .contains("Error while creating event at PagerDuty: x")
        );
    }

    #[tokio::test]
    async fn release_failure_after_success_fails_attempt() {
        let factory = ScriptedFactory::answering(202, r#"{"errors":[]}"#).failing_close();
        let err = notifier(&factory)
            .notify(&context(v2_config()))
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::Release(_)));
        assert!(err.to_string().contains("socket still in use"));
        assert!(
            err.to_string()
                .contains("There was an exception triggering the PagerDuty event")
        );
        assert_eq!(factory.closed(), 1);
    }

    #[tokio::test]
    async fn trigger_failure_wins_over_release_failure() {
        let factory = ScriptedFactory::answering(202, "{}")
            .failing_post()
            .failing_close();
        let err = notifier(&factory)
            .notify(&context(v2_config()))
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::Connection(_)));
        assert!(err.is_retryable());
        assert_eq!(factory.closed(), 1);
    }

    #[tokio::test]
    async fn unreadable_config_is_configuration_error() {
        let factory = ScriptedFactory::answering(202, "{}");
        let err = notifier(&factory)
            .notify(&context(serde_json::json!({"custom_incident": "yes"})))
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::Configuration(_)));
        assert_eq!(factory.created(), 0);
    }

    #[tokio::test]
    async fn malformed_client_url_fails_before_connecting() {
        let factory = ScriptedFactory::answering(202, "{}");
        let mut config = v2_config();
        config["client_url"] = "Test\\Wrong\\URL".into();

        let err = notifier(&factory)
            .notify(&context(config))
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::Build(_)));
        assert_eq!(factory.created(), 0);
        assert!(factory.requests().is_empty());
    }

    #[tokio::test]
    async fn custom_base_url_is_used() {
        let factory = ScriptedFactory::answering(202, "{}");
        PagerDutyNotifier::new(streams())
            .with_api_base_url("http://localhost:8089")
            .with_transport_factory(factory.clone())
            .notify(&context(v2_config()))
            .await
            .unwrap();

        assert_eq!(factory.requests()[0].0, "http://localhost:8089/v2/enqueue");
    }

    #[tokio::test]
    async fn usable_as_dyn_notifier() {
        let factory = ScriptedFactory::answering(202, r#"{"errors":null}"#);
        let notifier: Arc<dyn pagerlog_notifier::DynNotifier> = Arc::new(notifier(&factory));

        assert_eq!(notifier.name(), "pagerduty");
        notifier.notify(&context(v2_config())).await.unwrap();
        assert_eq!(factory.created(), 1);
    }
}
