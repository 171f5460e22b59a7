use serde::{Deserialize, Serialize};

use crate::event::{Event, EventDefinition};

/// Everything the host hands a notifier for one alert.
///
/// The notification config is kept as the raw JSON the host stored; each
/// notifier deserializes it into its own typed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationContext {
    /// Id of the notification definition being executed.
    pub notification_id: String,

    /// Raw notifier configuration as stored by the host.
    pub notification_config: serde_json::Value,

    /// The event that triggered this notification.
    pub event: Event,

    /// The event's definition. Absent for events raised outside a
    /// definition (e.g. system notifications or test triggers).
    #[serde(default)]
    pub event_definition: Option<EventDefinition>,
}

impl NotificationContext {
    pub fn new(
        notification_id: impl Into<String>,
        notification_config: serde_json::Value,
        event: Event,
    ) -> Self {
        Self {
            notification_id: notification_id.into(),
            notification_config,
            event,
            event_definition: None,
        }
    }

    /// Attach the event definition.
    #[must_use]
    pub fn with_event_definition(mut self, definition: EventDefinition) -> Self {
        self.event_definition = Some(definition);
        self
    }
}
