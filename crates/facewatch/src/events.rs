//! Event sinks for session events.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use facewatch_protocol::{Event, EventPayload};
use log::{info, warn};

/// Receives session events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Logs events through the `log` facade; failures at warn level.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: Event) {
        let detail = serde_json::to_string(&event.payload).unwrap_or_default();
        if event.payload.is_failure() {
            warn!("[{}] {} {}", event.session_id, event.payload.name(), detail);
        } else {
            info!("[{}] {} {}", event.session_id, event.payload.name(), detail);
        }
    }
}

/// Writes one JSON object per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn emit(&self, event: Event) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = write_line(&mut *writer, &event) {
            warn!("failed to write event {}: {}", event.payload.name(), err);
        }
    }
}

fn write_line<W: Write>(writer: &mut W, event: &Event) -> std::io::Result<()> {
    serde_json::to_writer(&mut *writer, event)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn payloads(&self) -> Vec<EventPayload> {
        self.events().into_iter().map(|e| e.payload).collect()
    }

    /// Event names in emission order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.payload.name()).collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facewatch_protocol::CameraFacing;

    #[test]
    fn json_lines_sink_writes_one_line_per_event() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.emit(Event::new(
            "s",
            1,
            EventPayload::CameraOpened {
                facing: CameraFacing::Front,
            },
        ));
        sink.emit(Event::new("s", 2, EventPayload::CameraClosed { error: None }));

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Event = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.ts, 1);
        assert!(lines[1].contains("\"event\":\"camera.closed\""));
    }

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.emit(Event::new("s", 1, EventPayload::PollerStarted { interval_ms: 5 }));
        sink.emit(Event::new("s", 2, EventPayload::PollerStopped { polls: 3 }));
        assert_eq!(sink.names(), vec!["poller.started", "poller.stopped"]);
    }
}
