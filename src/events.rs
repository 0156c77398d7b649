use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Lifecycle notifications forwarded to the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderEvent {
    /// The provider is ready to evaluate flags.
    Ready,
    /// The provider entered the error state.
    Error,
    /// Flag configuration changed on the server.
    ConfigurationChanged,
}

/// Details attached to a [`ProviderEvent`]. Forwarded opaquely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEventDetails {
    /// Free-form description of the event.
    pub message: Option<String>,
    /// Keys of flags affected by a configuration change.
    #[serde(default)]
    pub flags_changed: Vec<String>,
    /// Additional host-defined data.
    #[serde(default)]
    pub event_metadata: HashMap<String, String>,
}

impl ProviderEventDetails {
    /// Details carrying only a message.
    pub fn with_message(message: impl Into<String>) -> Self {
        ProviderEventDetails {
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Receives provider lifecycle events. Implemented by the host application.
///
/// Any `Fn(ProviderEvent, &ProviderEventDetails)` closure is an event handler.
pub trait EventHandler {
    /// Called for every emitted event.
    fn handle_event(&self, event: ProviderEvent, details: &ProviderEventDetails);

    /// Called once the provider has shut down.
    fn on_shutdown(&self) {}
}

pub(crate) struct NoopEventHandler;
impl EventHandler for NoopEventHandler {
    fn handle_event(&self, _event: ProviderEvent, _details: &ProviderEventDetails) {}
}

impl<T: Fn(ProviderEvent, &ProviderEventDetails)> EventHandler for T {
    fn handle_event(&self, event: ProviderEvent, details: &ProviderEventDetails) {
        self(event, details);
    }
}

/// Forwards events to the host-supplied handler.
pub(crate) struct EventEmitter<'a> {
    handler: Box<dyn EventHandler + Send + Sync + 'a>,
}

impl<'a> EventEmitter<'a> {
    pub fn new(handler: Box<dyn EventHandler + Send + Sync + 'a>) -> Self {
        EventEmitter { handler }
    }

    pub fn emit(&self, event: ProviderEvent, details: &ProviderEventDetails) {
        log::debug!(target: "flipt", event:serde; "emitting provider event");
        self.handler.handle_event(event, details);
    }

    pub fn shutdown(&self) {
        self.handler.on_shutdown();
    }
}
