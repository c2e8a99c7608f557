use std::sync::Arc;

use chrono::Utc;
use facewatch_protocol::{AlertSignal, Event, EventPayload};
use log::info;

use crate::events::EventSink;

/// Receives alert signals from the poller thread.
pub trait AlertHandler: Send + Sync {
    fn on_alert(&self, signal: AlertSignal);
}

/// Echoes each signal to the log.
#[derive(Debug, Default)]
pub struct LogAlertHandler;

impl AlertHandler for LogAlertHandler {
    fn on_alert(&self, signal: AlertSignal) {
        info!("alert signal: {signal}");
    }
}

/// Turns signals into `alert.signal` events for one session.
pub struct EventAlertHandler {
    sink: Arc<dyn EventSink>,
    session_id: String,
}

impl EventAlertHandler {
    pub fn new(sink: Arc<dyn EventSink>, session_id: impl Into<String>) -> Self {
        Self {
            sink,
            session_id: session_id.into(),
        }
    }
}

impl AlertHandler for EventAlertHandler {
    fn on_alert(&self, signal: AlertSignal) {
        self.sink.emit(Event::new(
            self.session_id.clone(),
            Utc::now().timestamp_millis(),
            EventPayload::AlertRaised { signal },
        ));
    }
}
