//! Background alert polling.
//!
//! While a session's camera is open, one dedicated thread polls the engine's
//! alert condition and forwards the answers to an [`AlertHandler`].

mod handler;
mod poller;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use handler::{AlertHandler, EventAlertHandler, LogAlertHandler};
pub use poller::AlertPoller;

/// Shortest poll interval the poller will park for.
pub const MIN_INTERVAL_MS: u64 = 1;

/// Alert polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Poll the engine at all. When false the task exits immediately.
    pub enabled: bool,
    /// Delay between polls in milliseconds. Must be non-zero.
    pub interval_ms: u64,
    /// Start polling only after the camera opened successfully.
    pub require_open_camera: bool,
    /// Forward a signal only when it differs from the previous one. Off by
    /// default: every poll result reaches the handler.
    pub only_changes: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 200,
            require_open_camera: true,
            only_changes: false,
        }
    }
}

impl AlertConfig {
    /// Poll interval, never shorter than [`MIN_INTERVAL_MS`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(MIN_INTERVAL_MS))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.interval_ms == 0 {
            return Err("alert.interval_ms must be greater than zero".to_string());
        }
        Ok(())
    }
}
