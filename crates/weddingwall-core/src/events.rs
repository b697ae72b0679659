//! Event emission towards the presentation layer.
//!
//! The core never talks to a UI toolkit directly. Gallery, lightbox and
//! session changes are published as named events with JSON payloads.

use std::sync::{Arc, Mutex};

pub const GALLERY_UPDATED: &str = "gallery:updated";
pub const LIGHTBOX_CHANGED: &str = "lightbox:changed";
pub const LIGHTBOX_SCROLL_LOCK: &str = "lightbox:scroll-lock";
pub const LIGHTBOX_KEY_LISTENER: &str = "lightbox:key-listener";
pub const SLIDESHOW_ADVANCED: &str = "slideshow:advanced";
pub const SETTINGS_CHANGED: &str = "settings-changed";
pub const SESSION_CHANGED: &str = "session-changed";

/// Trait for emitting events to the frontend.
pub trait EventSink: Send + Sync {
    /// Emit an event with the given name and JSON payload.
    ///
    /// # Arguments
    /// * `event_name` - The name of the event (e.g., "gallery:updated")
    /// * `payload_json` - JSON-serialized payload string
    fn emit(&self, event_name: &str, payload_json: &str);
}

/// Extension trait for EventSink that provides typed emit functionality.
pub trait EventSinkExt {
    /// Emit an event with a typed payload that will be serialized to JSON.
    fn emit_typed<T: serde::Serialize>(&self, event_name: &str, payload: &T);
}

impl<S: EventSink + ?Sized> EventSinkExt for S {
    fn emit_typed<T: serde::Serialize>(&self, event_name: &str, payload: &T) {
        match serde_json::to_string(payload) {
            Ok(json) => self.emit(event_name, &json),
            Err(e) => {
                tracing::error!("Failed to serialize event payload: {}", e);
            }
        }
    }
}

/// Shared reference to an EventSink implementation.
pub type SharedEventSink = Arc<dyn EventSink>;

/// No-op event sink for when events are not needed.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event_name: &str, _payload_json: &str) {}
}

/// Logging event sink, used by the headless kiosk.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventSink;

impl EventSink for LoggingEventSink {
    fn emit(&self, event_name: &str, payload_json: &str) {
        tracing::info!(event = event_name, payload = payload_json, "Event emitted");
    }
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded `(name, payload)` pairs, oldest first.
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Payloads of events with the given name.
    pub fn payloads(&self, event_name: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(name, _)| name == event_name)
            .map(|(_, payload)| payload)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event_name: &str, payload_json: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((event_name.to_string(), payload_json.to_string()));
        }
    }
}
