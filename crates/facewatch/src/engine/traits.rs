//! The inference engine boundary.

use facewatch_protocol::{AlertSignal, CameraFacing, ComputeMode, ModelId};
use serde::Serialize;

use super::assets::AssetSource;
use super::error::EngineResult;
use super::render::OutputWindow;

/// Engine state as perceived by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// No model loaded and no camera open.
    Unloaded,
    /// A model is resident; the camera is closed.
    ModelLoaded,
    /// The camera is open (with or without a model).
    CameraOpen,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Unloaded => write!(f, "unloaded"),
            EngineState::ModelLoaded => write!(f, "model_loaded"),
            EngineState::CameraOpen => write!(f, "camera_open"),
        }
    }
}

/// Contract between the session shell and a face-detection engine.
///
/// Every call blocks until the engine has finished. Calls never panic across
/// the boundary: failures come back as [`EngineError`](super::EngineError) and
/// calls made in the wrong state get a benign answer. Implementations are
/// shared between the lifecycle thread and the alert poller, so they must
/// synchronize internally.
pub trait InferenceEngine: Send + Sync {
    /// Load the detector `model` for `compute`, replacing any resident model.
    ///
    /// On failure the previously loaded model stays resident.
    fn load_model(
        &self,
        assets: &dyn AssetSource,
        model: ModelId,
        compute: ComputeMode,
    ) -> EngineResult<()>;

    /// Acquire exclusive access to the camera. Fails if one is already open.
    fn open_camera(&self, facing: CameraFacing) -> EngineResult<()>;

    /// Release the camera. Closing an already closed camera succeeds.
    fn close_camera(&self) -> EngineResult<()>;

    /// Bind (or rebind) the display target. Does not require a camera reopen.
    fn set_output_window(&self, window: OutputWindow) -> EngineResult<()>;

    /// Poll the current alert condition without side effects.
    ///
    /// Returns [`AlertSignal::Unavailable`] when the camera is closed.
    fn alert_trigger(&self) -> AlertSignal;

    fn state(&self) -> EngineState;
}
