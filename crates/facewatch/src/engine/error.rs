//! Engine error types.

use facewatch_protocol::{CameraFacing, ComputeMode, ModelId};
use thiserror::Error;

/// Result type for engine boundary calls.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors an inference engine reports instead of crashing.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A model asset could not be found.
    #[error("asset not found: {0}")]
    AssetMissing(String),

    /// The model id is not in the engine's catalog.
    #[error("unknown model: {0}")]
    UnknownModel(ModelId),

    /// The requested compute mode cannot run on this device.
    #[error("compute mode {0} not supported on this device")]
    UnsupportedComputeMode(ComputeMode),

    /// The requested camera does not exist or is held elsewhere.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(CameraFacing),

    /// Camera permission has not been granted.
    #[error("camera permission not granted")]
    PermissionDenied,

    /// A camera is already open on this engine.
    #[error("camera already open: {0}")]
    CameraBusy(CameraFacing),

    /// A boundary index did not map to a known value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Generic IO error while reading assets.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Map an asset read failure, keeping not-found distinct from other IO errors.
    pub fn from_asset_read(name: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            EngineError::AssetMissing(name.to_string())
        } else {
            EngineError::Io(err)
        }
    }
}
