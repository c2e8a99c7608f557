//! Index-based view of the engine, as seen from a native caller.
//!
//! Native callers pass enumerations as plain integers and expect boolean
//! success flags. This adapter converts at the edge and logs the error that
//! the flag collapses.

use std::sync::Arc;

use facewatch_protocol::{CameraFacing, ComputeMode, ModelId};
use log::warn;

use super::assets::AssetSource;
use super::error::{EngineError, EngineResult};
use super::render::OutputWindow;
use super::traits::InferenceEngine;

pub struct IndexedBinding {
    engine: Arc<dyn InferenceEngine>,
}

impl IndexedBinding {
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }

    pub fn load_model(&self, assets: &dyn AssetSource, model: i32, compute: i32) -> bool {
        let result = ModelId::try_from(model)
            .and_then(|m| ComputeMode::try_from(compute).map(|c| (m, c)))
            .map_err(EngineError::InvalidArgument)
            .and_then(|(m, c)| self.engine.load_model(assets, m, c));
        flag("load_model", result)
    }

    pub fn open_camera(&self, facing: i32) -> bool {
        let result = CameraFacing::try_from(facing)
            .map_err(EngineError::InvalidArgument)
            .and_then(|f| self.engine.open_camera(f));
        flag("open_camera", result)
    }

    pub fn close_camera(&self) -> bool {
        flag("close_camera", self.engine.close_camera())
    }

    /// A missing surface is rejected without reaching the engine.
    pub fn set_output_window(&self, window: Option<OutputWindow>) -> bool {
        let result = window
            .ok_or_else(|| EngineError::InvalidArgument("null output window".to_string()))
            .and_then(|w| self.engine.set_output_window(w));
        flag("set_output_window", result)
    }

    /// Alert poll in the native text form (`"NO FACE"`, `"0"`, `"1"`).
    pub fn alert_trigger(&self) -> String {
        self.engine.alert_trigger().native_str().to_string()
    }
}

fn flag(call: &str, result: EngineResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!("{call} failed: {err}");
            false
        }
    }
}
