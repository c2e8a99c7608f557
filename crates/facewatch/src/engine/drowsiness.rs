//! Eyes-closed alert timing.
//!
//! A single tracked face whose mean eye aspect ratio stays below the threshold
//! for longer than `alert_after` (measured from the last frame with open eyes)
//! raises the alert. Frames with no face or several faces never raise it and
//! leave the timer alone.

use std::time::Duration;

use facewatch_protocol::AlertSignal;
use serde::{Deserialize, Serialize};

use super::detector::FaceObservation;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrowsinessConfig {
    /// Mean EAR below which eyes count as closed.
    pub ear_threshold: f32,
    /// How long eyes must stay closed before alerting, in milliseconds.
    pub alert_after_ms: u64,
}

impl Default for DrowsinessConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.35,
            alert_after_ms: 2000,
        }
    }
}

impl DrowsinessConfig {
    pub fn alert_after(&self) -> Duration {
        Duration::from_millis(self.alert_after_ms)
    }
}

#[derive(Debug, Clone)]
pub struct DrowsinessMonitor {
    config: DrowsinessConfig,
    /// Timestamp of the last open-eyes frame, or of the first closed one.
    reference: Option<Duration>,
    current: AlertSignal,
}

impl DrowsinessMonitor {
    pub fn new(config: DrowsinessConfig) -> Self {
        Self {
            config,
            reference: None,
            current: AlertSignal::NoFace,
        }
    }

    /// Feed the faces detected in one frame captured at `now`.
    pub fn observe(&mut self, faces: &[FaceObservation], now: Duration) -> AlertSignal {
        self.current = match faces {
            [] => AlertSignal::NoFace,
            [face] => self.observe_single(face, now),
            _ => AlertSignal::Clear,
        };
        self.current
    }

    fn observe_single(&mut self, face: &FaceObservation, now: Duration) -> AlertSignal {
        if face.mean_ear() >= self.config.ear_threshold {
            self.reference = Some(now);
            return AlertSignal::Clear;
        }

        let since = *self.reference.get_or_insert(now);
        if now.saturating_sub(since) > self.config.alert_after() {
            AlertSignal::Alert
        } else {
            AlertSignal::Clear
        }
    }

    /// Signal computed for the most recent frame.
    pub fn current(&self) -> AlertSignal {
        self.current
    }

    pub fn reset(&mut self) {
        self.reference = None;
        self.current = AlertSignal::NoFace;
    }
}
