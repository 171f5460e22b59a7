use chrono::SecondsFormat;
use pagerlog_core::{EventDefinition, NotificationContext, Stream};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::config::{ApiVersion, NotificationConfig};
use crate::error::PagerDutyError;
use crate::types::{
    EnqueueEvent, EventPayload, GenericDetails, GenericEvent, Link, PagerDutyMessage, Severity,
};
use crate::validation::{UrlProblem, parse_client_url};

/// Title used in deduplication keys when the event has no definition.
pub const UNDEFINED_TITLE: &str = "Undefined";

const EVENT_ACTION: &str = "trigger";
const COMPONENT: &str = "GraylogAlerts";
const CLASS: &str = "alerts";
const SOURCE_PREFIX: &str = "Graylog:";

/// Characters escaped in a stream id path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped in the `q` search parameter. `=` and `:` stay readable.
const QUERY: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Maps a host alert into a `PagerDuty` trigger message.
///
/// Building is deterministic and does no I/O: the same context, streams and
/// config always produce the same message.
pub struct MessageBuilder<'a> {
    config: &'a NotificationConfig,
}

impl<'a> MessageBuilder<'a> {
    pub fn new(config: &'a NotificationConfig) -> Self {
        Self { config }
    }

    /// Build the trigger message in the payload generation selected by the
    /// config. `streams` are the resolved source streams of the event.
    pub fn build(
        &self,
        ctx: &NotificationContext,
        streams: &[Stream],
    ) -> Result<PagerDutyMessage, PagerDutyError> {
        let links = self.stream_links(ctx.event_definition.as_ref(), streams)?;
        let message = match self.config.api_version() {
            ApiVersion::V1 => PagerDutyMessage::V1(self.generic_event(ctx, streams, links)),
            ApiVersion::V2 => PagerDutyMessage::V2(self.enqueue_event(ctx, links)),
        };
        Ok(message)
    }

    /// `prefix/[stream ids]/definition title`, or empty when custom keys are
    /// disabled.
    pub fn dedup_key(&self, ctx: &NotificationContext) -> String {
        if !self.config.custom_incident() {
            return String::new();
        }
        let title = ctx
            .event_definition
            .as_ref()
            .map_or(UNDEFINED_TITLE, |definition| definition.title.as_str());
        format!(
            "{}/{}/{}",
            self.config.key_prefix(),
            ctx.event.source_stream_list(),
            title
        )
    }

    /// One search link per stream, below the configured client URL.
    ///
    /// An empty client URL yields no links; a client URL that is not an
    /// absolute `http`/`https` URL is an error even when there are no streams.
    pub fn stream_links(
        &self,
        definition: Option<&EventDefinition>,
        streams: &[Stream],
    ) -> Result<Vec<Link>, PagerDutyError> {
        let client_url = self.config.client_url();
        if client_url.is_empty() {
            return Ok(Vec::new());
        }
        parse_client_url(client_url).map_err(|problem| PagerDutyError::MalformedClientUrl {
            url: client_url.to_owned(),
            reason: match problem {
                UrlProblem::Unparseable(reason) => reason,
                UrlProblem::Scheme => "scheme must be http or https".to_owned(),
            },
        })?;

        let base = client_url.trim_end_matches('/');
        let query = definition
            .and_then(|d| d.query.as_deref())
            .filter(|q| !q.is_empty());

        let links = streams
            .iter()
            .map(|stream| {
                let mut href = format!(
                    "{base}/streams/{}/search",
                    utf8_percent_encode(&stream.id, SEGMENT)
                );
                if let Some(query) = query {
                    href.push_str("?q=");
                    href.extend(utf8_percent_encode(query, QUERY));
                }
                Link {
                    href,
                    text: stream.title.clone(),
                }
            })
            .collect();
        Ok(links)
    }

    fn severity(ctx: &NotificationContext) -> Severity {
        ctx.event_definition
            .as_ref()
            .map_or(Severity::Info, |d| Severity::from_priority(d.priority))
    }

    fn timestamp(ctx: &NotificationContext) -> String {
        ctx.event
            .event_timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, false)
    }

    fn enqueue_event(&self, ctx: &NotificationContext, links: Vec<Link>) -> EnqueueEvent {
        let stream_ids = ctx.event.source_stream_list();
        EnqueueEvent {
            routing_key: self.config.routing_key().to_owned(),
            event_action: EVENT_ACTION.into(),
            dedup_key: self.dedup_key(ctx),
            client: self.config.client_name().to_owned(),
            client_url: self.config.client_url().to_owned(),
            payload: EventPayload {
                summary: ctx.event.message.clone(),
                severity: Self::severity(ctx),
                component: COMPONENT.into(),
                source: format!("{SOURCE_PREFIX}{stream_ids}"),
                class: CLASS.into(),
                timestamp: Self::timestamp(ctx),
                group: stream_ids,
            },
            links,
        }
    }

    fn generic_event(
        &self,
        ctx: &NotificationContext,
        streams: &[Stream],
        links: Vec<Link>,
    ) -> GenericEvent {
        let definition = ctx.event_definition.as_ref();
        GenericEvent {
            service_key: self.config.routing_key().to_owned(),
            event_type: EVENT_ACTION.into(),
            description: ctx.event.message.clone(),
            incident_key: self.dedup_key(ctx),
            client: self.config.client_name().to_owned(),
            client_url: self.config.client_url().to_owned(),
            details: GenericDetails {
                stream_ids: ctx.event.source_stream_list(),
                stream_titles: streams.iter().map(|s| s.title.clone()).collect(),
                event_definition: definition.map(|d| d.title.clone()),
                priority: definition.map(|d| d.priority),
                severity: Self::severity(ctx),
                timestamp: Self::timestamp(ctx),
            },
            contexts: links.into_iter().map(Into::into).collect(),
        }
    }
}
