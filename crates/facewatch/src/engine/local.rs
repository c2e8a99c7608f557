//! In-process reference engine.
//!
//! Holds the same process-wide state a native engine would (resident model,
//! open camera, bound window, latest detections) behind one mutex, and runs
//! the render path for frames pushed into it with [`LocalEngine::render_frame`].

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use facewatch_protocol::{AlertSignal, CameraFacing, ComputeMode, ModelId};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::assets::AssetSource;
use super::catalog::{ModelCatalog, ModelSpec};
use super::detector::{AnnotatedDetectorFactory, DetectorFactory, FaceDetector, Frame};
use super::drowsiness::{DrowsinessConfig, DrowsinessMonitor};
use super::error::{EngineError, EngineResult};
use super::fps::FpsMeter;
use super::render::{Banner, FaceBox, OutputWindow, Overlay};
use super::traits::{EngineState, InferenceEngine};

/// Device capabilities and tuning for [`LocalEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalEngineConfig {
    /// Number of usable GPUs; GPU compute is rejected when zero.
    pub gpu_count: u32,
    /// Cameras present on the device.
    pub facings: Vec<CameraFacing>,
    /// Whether camera permission has been granted.
    pub camera_permission: bool,
    /// Minimum detection score for a face to count.
    pub min_face_score: f32,
    pub drowsiness: DrowsinessConfig,
}

impl Default for LocalEngineConfig {
    fn default() -> Self {
        Self {
            gpu_count: 0,
            facings: vec![CameraFacing::Front, CameraFacing::Back],
            camera_permission: true,
            min_face_score: 0.5,
            drowsiness: DrowsinessConfig::default(),
        }
    }
}

/// Model resident in the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedModel {
    pub id: ModelId,
    pub spec: ModelSpec,
    pub compute: ComputeMode,
    pub weight_bytes: usize,
}

struct Inner {
    model: Option<LoadedModel>,
    detector: Option<Box<dyn FaceDetector>>,
    camera: Option<CameraFacing>,
    window: Option<OutputWindow>,
    drowsiness: DrowsinessMonitor,
    fps: FpsMeter,
    frames_rendered: u64,
}

pub struct LocalEngine {
    config: LocalEngineConfig,
    catalog: ModelCatalog,
    factory: Box<dyn DetectorFactory>,
    inner: Mutex<Inner>,
}

impl LocalEngine {
    pub fn new(config: LocalEngineConfig, catalog: ModelCatalog) -> Self {
        let factory = AnnotatedDetectorFactory {
            min_score: config.min_face_score,
        };
        Self::with_factory(config, catalog, Box::new(factory))
    }

    pub fn with_factory(
        config: LocalEngineConfig,
        catalog: ModelCatalog,
        factory: Box<dyn DetectorFactory>,
    ) -> Self {
        let inner = Inner {
            model: None,
            detector: None,
            camera: None,
            window: None,
            drowsiness: DrowsinessMonitor::new(config.drowsiness),
            fps: FpsMeter::new(),
            frames_rendered: 0,
        };
        Self {
            config,
            catalog,
            factory,
            inner: Mutex::new(inner),
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// A poisoned lock only means a detector panicked mid-frame; the state is
    /// still consistent enough to keep answering boundary calls.
    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn loaded_model(&self) -> Option<LoadedModel> {
        self.inner().model.clone()
    }

    pub fn open_facing(&self) -> Option<CameraFacing> {
        self.inner().camera
    }

    pub fn bound_window(&self) -> Option<OutputWindow> {
        self.inner().window.clone()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.inner().frames_rendered
    }

    /// Run detection and alert timing on one camera frame and present the
    /// overlay to the bound window.
    ///
    /// The engine lock is released before the window is presented to, so
    /// alert polls are not held up by slow render targets.
    ///
    /// Frames arriving while the camera is closed are dropped and `None` is
    /// returned.
    pub fn render_frame(&self, frame: &Frame) -> Option<Overlay> {
        let mut guard = self.inner();
        let inner = &mut *guard;
        inner.camera?;

        let now = Duration::from_millis(frame.timestamp_ms);
        let (faces, banner) = match inner.detector.as_mut() {
            Some(detector) => {
                let faces = detector.detect(frame);
                let signal = inner.drowsiness.observe(&faces, now);
                let banner = signal.is_alert().then_some(Banner::Alert);
                (faces.iter().map(FaceBox::from).collect(), banner)
            }
            None => (Vec::new(), Some(Banner::Unsupported)),
        };

        let overlay = Overlay {
            frame_id: frame.id,
            size: frame.size,
            faces,
            banner,
            fps: inner.fps.tick(now),
        };
        inner.frames_rendered += 1;

        // Present outside the lock; targets may call back into the engine.
        let window = inner.window.clone();
        drop(guard);
        if let Some(window) = window {
            window.present(&overlay);
        }
        Some(overlay)
    }

    fn read_asset(assets: &dyn AssetSource, name: &str) -> EngineResult<Vec<u8>> {
        assets
            .read(name)
            .map_err(|err| EngineError::from_asset_read(name, err))
    }
}

impl InferenceEngine for LocalEngine {
    fn load_model(
        &self,
        assets: &dyn AssetSource,
        model: ModelId,
        compute: ComputeMode,
    ) -> EngineResult<()> {
        let spec = self
            .catalog
            .get(model)
            .cloned()
            .ok_or(EngineError::UnknownModel(model))?;

        if compute.uses_gpu() && self.config.gpu_count == 0 {
            warn!("GPU compute requested for {} but no GPU is available", spec.name);
            return Err(EngineError::UnsupportedComputeMode(compute));
        }

        // Read both assets before touching resident state so a failure leaves
        // the previous model in place.
        let param = Self::read_asset(assets, &spec.param_asset())?;
        let weights = Self::read_asset(assets, &spec.weights_asset())?;
        if param.is_empty() {
            return Err(EngineError::AssetMissing(spec.param_asset()));
        }

        let detector = self.factory.build(&spec, compute);

        let mut inner = self.inner();
        info!(
            "loaded {} (target {}px) on {} from {}",
            spec.name, spec.target_size, compute, spec.asset_stem
        );
        inner.model = Some(LoadedModel {
            id: model,
            spec,
            compute,
            weight_bytes: weights.len(),
        });
        inner.detector = Some(detector);
        inner.drowsiness.reset();
        Ok(())
    }

    fn open_camera(&self, facing: CameraFacing) -> EngineResult<()> {
        if !self.config.camera_permission {
            return Err(EngineError::PermissionDenied);
        }
        if !self.config.facings.contains(&facing) {
            return Err(EngineError::CameraUnavailable(facing));
        }

        let mut inner = self.inner();
        if let Some(open) = inner.camera {
            return Err(EngineError::CameraBusy(open));
        }
        inner.camera = Some(facing);
        inner.fps.reset();
        inner.drowsiness.reset();
        info!("opened {} camera", facing);
        Ok(())
    }

    fn close_camera(&self) -> EngineResult<()> {
        let mut inner = self.inner();
        match inner.camera.take() {
            Some(facing) => {
                inner.drowsiness.reset();
                info!("closed {} camera", facing);
            }
            None => debug!("close_camera with no open camera"),
        }
        Ok(())
    }

    fn set_output_window(&self, window: OutputWindow) -> EngineResult<()> {
        debug!(
            "binding output window {} ({}x{})",
            window.id(),
            window.width(),
            window.height()
        );
        self.inner().window = Some(window);
        Ok(())
    }

    fn alert_trigger(&self) -> AlertSignal {
        let inner = self.inner();
        if inner.camera.is_none() {
            return AlertSignal::Unavailable;
        }
        inner.drowsiness.current()
    }

    fn state(&self) -> EngineState {
        let inner = self.inner();
        match (&inner.model, inner.camera) {
            (_, Some(_)) => EngineState::CameraOpen,
            (Some(_), None) => EngineState::ModelLoaded,
            (None, None) => EngineState::Unloaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::MemoryAssets;

    fn assets() -> MemoryAssets {
        MemoryAssets::new()
            .with_file("Models/blazeface.param", b"7767517\n".to_vec())
            .with_file("Models/blazeface.bin", vec![0u8; 64])
    }

    #[test]
    fn state_follows_load_open_close() {
        let engine = LocalEngine::new(LocalEngineConfig::default(), ModelCatalog::default());
        assert_eq!(engine.state(), EngineState::Unloaded);

        engine
            .load_model(&assets(), ModelId(0), ComputeMode::Cpu)
            .unwrap();
        assert_eq!(engine.state(), EngineState::ModelLoaded);

        engine.open_camera(CameraFacing::Front).unwrap();
        assert_eq!(engine.state(), EngineState::CameraOpen);

        engine.close_camera().unwrap();
        assert_eq!(engine.state(), EngineState::ModelLoaded);
        assert_eq!(engine.loaded_model().unwrap().weight_bytes, 64);
    }

    #[test]
    fn empty_param_file_counts_as_missing() {
        let engine = LocalEngine::new(LocalEngineConfig::default(), ModelCatalog::default());
        let assets = MemoryAssets::new()
            .with_file("Models/blazeface.param", Vec::new())
            .with_file("Models/blazeface.bin", vec![1u8]);
        let err = engine
            .load_model(&assets, ModelId(0), ComputeMode::Cpu)
            .unwrap_err();
        assert!(matches!(err, EngineError::AssetMissing(_)));
        assert!(engine.loaded_model().is_none());
    }
}
