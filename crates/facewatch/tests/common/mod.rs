//! Test utilities and common setup.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use facewatch::alert::{AlertConfig, AlertHandler};
use facewatch::engine::{
    AssetSource, EngineError, EngineResult, EngineState, InferenceEngine, MemoryAssets, NullTarget,
    OutputWindow,
};
use facewatch::protocol::{AlertSignal, CameraFacing, ComputeMode, ModelId};

/// One call made across the engine boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    LoadModel { model: ModelId, compute: ComputeMode },
    OpenCamera(CameraFacing),
    CloseCamera,
    SetOutputWindow { id: u64 },
    AlertTrigger,
}

/// Engine fake that records every call and fails on demand.
pub struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
    fail_load: AtomicBool,
    fail_open: AtomicBool,
    fail_close: AtomicBool,
    open: AtomicBool,
    signal: Mutex<AlertSignal>,
    alert_calls: AtomicU64,
}

impl RecordingEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_load: AtomicBool::new(false),
            fail_open: AtomicBool::new(false),
            fail_close: AtomicBool::new(false),
            open: AtomicBool::new(false),
            signal: Mutex::new(AlertSignal::Clear),
            alert_calls: AtomicU64::new(0),
        })
    }

    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::SeqCst);
    }

    pub fn set_signal(&self, signal: AlertSignal) {
        *self.signal.lock().unwrap() = signal;
    }

    pub fn alert_calls(&self) -> u64 {
        self.alert_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls made by the lifecycle thread, i.e. everything but alert polls.
    pub fn lifecycle_calls(&self) -> Vec<EngineCall> {
        self.calls()
            .into_iter()
            .filter(|call| *call != EngineCall::AlertTrigger)
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls().iter().filter(|call| pred(call)).count()
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl InferenceEngine for RecordingEngine {
    fn load_model(
        &self,
        _assets: &dyn AssetSource,
        model: ModelId,
        compute: ComputeMode,
    ) -> EngineResult<()> {
        self.record(EngineCall::LoadModel { model, compute });
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(EngineError::AssetMissing("Models/blazeface.param".to_string()));
        }
        Ok(())
    }

    fn open_camera(&self, facing: CameraFacing) -> EngineResult<()> {
        self.record(EngineCall::OpenCamera(facing));
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(EngineError::PermissionDenied);
        }
        if self.open.swap(true, Ordering::SeqCst) {
            return Err(EngineError::CameraBusy(facing));
        }
        Ok(())
    }

    fn close_camera(&self) -> EngineResult<()> {
        self.record(EngineCall::CloseCamera);
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(EngineError::Io(std::io::Error::other("camera device hung")));
        }
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_output_window(&self, window: OutputWindow) -> EngineResult<()> {
        self.record(EngineCall::SetOutputWindow { id: window.id() });
        Ok(())
    }

    fn alert_trigger(&self) -> AlertSignal {
        self.alert_calls.fetch_add(1, Ordering::SeqCst);
        self.record(EngineCall::AlertTrigger);
        *self.signal.lock().unwrap()
    }

    fn state(&self) -> EngineState {
        if self.open.load(Ordering::SeqCst) {
            EngineState::CameraOpen
        } else {
            EngineState::Unloaded
        }
    }
}

/// Handler that keeps every signal it receives.
#[derive(Default)]
pub struct RecordingHandler {
    signals: Mutex<Vec<AlertSignal>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn signals(&self) -> Vec<AlertSignal> {
        self.signals.lock().unwrap().clone()
    }
}

impl AlertHandler for RecordingHandler {
    fn on_alert(&self, signal: AlertSignal) {
        self.signals.lock().unwrap().push(signal);
    }
}

/// Fast polling so tests don't wait long.
pub fn fast_alert_config() -> AlertConfig {
    AlertConfig {
        interval_ms: 5,
        ..AlertConfig::default()
    }
}

pub fn model_assets() -> MemoryAssets {
    MemoryAssets::new()
        .with_file("Models/blazeface.param", b"7767517\n".to_vec())
        .with_file("Models/blazeface.bin", vec![0u8; 128])
}

pub fn window(width: u32, height: u32) -> OutputWindow {
    OutputWindow::new(width, height, Arc::new(NullTarget))
}

/// Poll `cond` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}
