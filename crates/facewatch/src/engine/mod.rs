//! Inference engine boundary and the in-process reference engine.
//!
//! Provides:
//! - The [`InferenceEngine`] contract the session shell drives
//! - Model catalog and asset sources
//! - [`LocalEngine`], which implements the contract in-process
//! - An index-based adapter for native callers

mod assets;
mod boundary;
mod catalog;
mod detector;
mod drowsiness;
mod error;
mod fps;
mod local;
mod render;
mod traits;

pub use assets::{AssetSource, DirAssets, MemoryAssets};
pub use boundary::IndexedBinding;
pub use catalog::{ModelCatalog, ModelSpec};
pub use detector::{
    AnnotatedDetectorFactory, AnnotatedFrameDetector, DetectorFactory, FaceDetector,
    FaceObservation, Frame,
};
pub use drowsiness::{DrowsinessConfig, DrowsinessMonitor};
pub use error::{EngineError, EngineResult};
pub use fps::FpsMeter;
pub use local::{LoadedModel, LocalEngine, LocalEngineConfig};
pub use render::{Banner, FaceBox, NullTarget, OutputWindow, Overlay, RenderTarget, TraceTarget};
pub use traits::{EngineState, InferenceEngine};
