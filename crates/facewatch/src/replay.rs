//! Frame trace replay.
//!
//! A trace is a JSON-lines file, one [`Frame`] per line, with non-decreasing
//! timestamps. Blank lines and lines starting with `#` are skipped.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use facewatch_protocol::AlertSignal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, info_span};

use crate::engine::{Banner, Frame, LocalEngine};

pub type ReplayResult<T> = Result<T, ReplayError>;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("io error reading trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: timestamp {timestamp_ms} is earlier than the previous frame")]
    OutOfOrder { line: usize, timestamp_ms: u64 },

    #[error("trace contains no frames")]
    Empty,
}

/// Parse a trace from text.
pub fn parse_trace(text: &str) -> ReplayResult<Vec<Frame>> {
    let mut frames: Vec<Frame> = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let frame: Frame =
            serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse { line, source })?;
        if let Some(prev) = frames.last() {
            if frame.timestamp_ms < prev.timestamp_ms {
                return Err(ReplayError::OutOfOrder {
                    line,
                    timestamp_ms: frame.timestamp_ms,
                });
            }
        }
        frames.push(frame);
    }

    if frames.is_empty() {
        return Err(ReplayError::Empty);
    }
    Ok(frames)
}

pub fn load_trace(path: &Path) -> ReplayResult<Vec<Frame>> {
    parse_trace(&fs::read_to_string(path)?)
}

#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    /// Sleep between frames to match trace timing.
    pub realtime: bool,
    /// Playback speed multiplier when `realtime` is set.
    pub speed: f32,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            realtime: true,
            speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayStats {
    pub frames: u64,
    /// Frames dropped because the camera was closed.
    pub dropped: u64,
    /// Frames drawn with the alert banner.
    pub alert_frames: u64,
    /// Frames drawn with the unsupported banner (no model).
    pub unsupported_frames: u64,
    pub last_fps: Option<f32>,
    /// Engine alert state after the last frame.
    pub final_signal: Option<AlertSignal>,
}

/// Push every frame through the engine's render path.
pub fn replay(engine: &LocalEngine, frames: &[Frame], options: ReplayOptions) -> ReplayStats {
    let span = info_span!("replay", frames = frames.len());
    let _enter = span.enter();

    let mut stats = ReplayStats::default();
    let mut prev_ts: Option<u64> = None;

    for frame in frames {
        if options.realtime {
            if let Some(prev) = prev_ts {
                let gap = frame.timestamp_ms.saturating_sub(prev) as f32 / options.speed.max(0.01);
                thread::sleep(Duration::from_millis(gap as u64));
            }
        }
        prev_ts = Some(frame.timestamp_ms);

        stats.frames += 1;
        let Some(overlay) = engine.render_frame(frame) else {
            stats.dropped += 1;
            continue;
        };
        match overlay.banner {
            Some(Banner::Alert) => stats.alert_frames += 1,
            Some(Banner::Unsupported) => stats.unsupported_frames += 1,
            None => {}
        }
        if overlay.fps.is_some() {
            stats.last_fps = overlay.fps;
        }
        debug!(frame = frame.id, faces = overlay.faces.len(), "rendered");
    }

    stats.final_signal = Some(crate::engine::InferenceEngine::alert_trigger(engine));
    info!(
        frames = stats.frames,
        alerts = stats.alert_frames,
        dropped = stats.dropped,
        "replay finished"
    );
    stats
}
