//! Session event types.
//!
//! Events are ephemeral records of what a session did to the engine and what
//! the engine answered. Each event is self-contained so a consumer can render
//! it without tracking history.

use serde::{Deserialize, Serialize};

use crate::types::{AlertSignal, CameraFacing, ComputeMode, ModelId};

// ============================================================================
// Event envelope
// ============================================================================

/// An event with routing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Which session this event belongs to.
    pub session_id: String,

    /// Unix ms timestamp.
    pub ts: i64,

    /// The event payload.
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    pub fn new(session_id: impl Into<String>, ts: i64, payload: EventPayload) -> Self {
        Self {
            session_id: session_id.into(),
            ts,
            payload,
        }
    }
}

// ============================================================================
// Event payloads
// ============================================================================

/// All event types, tagged by `event` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventPayload {
    // -- Model --
    #[serde(rename = "model.loaded")]
    ModelLoaded { model: ModelId, compute: ComputeMode },

    /// Load failed; whatever was loaded before stays resident.
    #[serde(rename = "model.load_failed")]
    ModelLoadFailed {
        model: ModelId,
        compute: ComputeMode,
        error: String,
    },

    // -- Camera --
    #[serde(rename = "camera.opened")]
    CameraOpened { facing: CameraFacing },

    #[serde(rename = "camera.open_failed")]
    CameraOpenFailed { facing: CameraFacing, error: String },

    #[serde(rename = "camera.closed")]
    CameraClosed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    // -- Output --
    #[serde(rename = "window.bound")]
    WindowBound { width: u32, height: u32 },

    #[serde(rename = "window.bind_failed")]
    WindowBindFailed { error: String },

    // -- Alert polling --
    #[serde(rename = "poller.started")]
    PollerStarted { interval_ms: u64 },

    #[serde(rename = "poller.stopped")]
    PollerStopped { polls: u64 },

    #[serde(rename = "alert.signal")]
    AlertRaised { signal: AlertSignal },
}

impl EventPayload {
    /// Dotted event name, as it appears in the `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            EventPayload::ModelLoaded { .. } => "model.loaded",
            EventPayload::ModelLoadFailed { .. } => "model.load_failed",
            EventPayload::CameraOpened { .. } => "camera.opened",
            EventPayload::CameraOpenFailed { .. } => "camera.open_failed",
            EventPayload::CameraClosed { .. } => "camera.closed",
            EventPayload::WindowBound { .. } => "window.bound",
            EventPayload::WindowBindFailed { .. } => "window.bind_failed",
            EventPayload::PollerStarted { .. } => "poller.started",
            EventPayload::PollerStopped { .. } => "poller.stopped",
            EventPayload::AlertRaised { .. } => "alert.signal",
        }
    }

    /// Whether this event reports a failed engine call.
    pub fn is_failure(&self) -> bool {
        match self {
            EventPayload::ModelLoadFailed { .. }
            | EventPayload::CameraOpenFailed { .. }
            | EventPayload::WindowBindFailed { .. } => true,
            EventPayload::CameraClosed { error } => error.is_some(),
            _ => false,
        }
    }
}
