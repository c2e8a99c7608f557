//! Session data models.

use chrono::{DateTime, Utc};
use facewatch_protocol::{CameraFacing, ModelSelection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What to do with an open camera when the model is reloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Reload while the camera keeps streaming.
    #[default]
    InPlace,
    /// Close the camera, reload, reopen and rebind the last window.
    CloseAndReopen,
}

impl std::fmt::Display for ReloadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReloadPolicy::InPlace => write!(f, "in_place"),
            ReloadPolicy::CloseAndReopen => write!(f, "close_and_reopen"),
        }
    }
}

impl std::str::FromStr for ReloadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "in_place" => Ok(ReloadPolicy::InPlace),
            "close_and_reopen" => Ok(ReloadPolicy::CloseAndReopen),
            _ => Err(format!("unknown reload policy: {}", s)),
        }
    }
}

/// Session settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Camera the session binds to; fixed for the session's lifetime.
    pub facing: CameraFacing,
    /// Model selected when the host starts.
    pub selection: ModelSelection,
    pub reload: ReloadPolicy,
}

/// One binding between a camera and a display surface.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub facing: CameraFacing,
    /// Model the user last selected.
    pub selection: ModelSelection,
    /// Model the engine last loaded successfully.
    pub loaded: Option<ModelSelection>,
    pub is_open: bool,
    pub window_bound: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(facing: CameraFacing, selection: ModelSelection) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            facing,
            selection,
            loaded: None,
            is_open: false,
            window_bound: false,
            created_at: Utc::now(),
        }
    }
}
