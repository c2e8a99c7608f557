//! Boundary enumerations.

use serde::{Deserialize, Serialize};

// ============================================================================
// Camera facing
// ============================================================================

/// Which physical camera a session binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    /// Front (selfie) camera. Boundary index 0.
    #[default]
    Front,
    /// Back camera. Boundary index 1.
    Back,
}

impl CameraFacing {
    /// Integer passed across the engine boundary.
    pub fn index(self) -> i32 {
        match self {
            CameraFacing::Front => 0,
            CameraFacing::Back => 1,
        }
    }
}

impl std::fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraFacing::Front => write!(f, "front"),
            CameraFacing::Back => write!(f, "back"),
        }
    }
}

impl std::str::FromStr for CameraFacing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "front" | "0" => Ok(CameraFacing::Front),
            "back" | "1" => Ok(CameraFacing::Back),
            _ => Err(format!("unknown camera facing: {}", s)),
        }
    }
}

impl TryFrom<i32> for CameraFacing {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CameraFacing::Front),
            1 => Ok(CameraFacing::Back),
            _ => Err(format!("camera facing index out of range: {}", value)),
        }
    }
}

// ============================================================================
// Compute mode
// ============================================================================

/// Execution path inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeMode {
    /// CPU inference. Boundary index 0.
    #[default]
    Cpu,
    /// GPU (Vulkan) inference. Boundary index 1.
    Gpu,
}

impl ComputeMode {
    /// Integer passed across the engine boundary.
    pub fn index(self) -> i32 {
        match self {
            ComputeMode::Cpu => 0,
            ComputeMode::Gpu => 1,
        }
    }

    pub fn uses_gpu(self) -> bool {
        matches!(self, ComputeMode::Gpu)
    }
}

impl std::fmt::Display for ComputeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputeMode::Cpu => write!(f, "cpu"),
            ComputeMode::Gpu => write!(f, "gpu"),
        }
    }
}

impl std::str::FromStr for ComputeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cpu" | "0" => Ok(ComputeMode::Cpu),
            "gpu" | "1" => Ok(ComputeMode::Gpu),
            _ => Err(format!("unknown compute mode: {}", s)),
        }
    }
}

impl TryFrom<i32> for ComputeMode {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ComputeMode::Cpu),
            1 => Ok(ComputeMode::Gpu),
            _ => Err(format!("compute mode index out of range: {}", value)),
        }
    }
}

// ============================================================================
// Model selection
// ============================================================================

/// Index of a detector variant in the engine's model catalog.
///
/// The index is only meaningful against a catalog; the engine rejects ids it
/// does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(pub usize);

impl ModelId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for ModelId {
    fn from(value: usize) -> Self {
        ModelId(value)
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for ModelId {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .map(ModelId)
            .map_err(|_| format!("model index out of range: {}", value))
    }
}

/// The `(model, compute)` pair a session asks the engine to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelSelection {
    pub model: ModelId,
    pub compute: ComputeMode,
}

impl ModelSelection {
    pub fn new(model: impl Into<ModelId>, compute: ComputeMode) -> Self {
        Self {
            model: model.into(),
            compute,
        }
    }

    pub fn with_model(self, model: impl Into<ModelId>) -> Self {
        Self {
            model: model.into(),
            ..self
        }
    }

    pub fn with_compute(self, compute: ComputeMode) -> Self {
        Self { compute, ..self }
    }
}

impl std::fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "model {} on {}", self.model, self.compute)
    }
}

// ============================================================================
// Alert signal
// ============================================================================

/// Answer to an engine alert poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSignal {
    /// No face in the most recent frame.
    NoFace,
    /// A face is tracked and no alert condition holds.
    Clear,
    /// The alert condition holds (eyes closed for too long).
    Alert,
    /// The engine cannot answer: camera closed or engine torn down.
    Unavailable,
}

impl AlertSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertSignal::NoFace => "no_face",
            AlertSignal::Clear => "clear",
            AlertSignal::Alert => "alert",
            AlertSignal::Unavailable => "unavailable",
        }
    }

    /// Text the native engine hands back from its alert poll: `"NO FACE"`,
    /// `"0"` (clear) or `"1"` (alert). The native engine has no closed-camera
    /// answer, so `Unavailable` is sent as `"UNAVAILABLE"`.
    pub fn native_str(self) -> &'static str {
        match self {
            AlertSignal::NoFace => "NO FACE",
            AlertSignal::Clear => "0",
            AlertSignal::Alert => "1",
            AlertSignal::Unavailable => "UNAVAILABLE",
        }
    }

    pub fn is_alert(self) -> bool {
        matches!(self, AlertSignal::Alert)
    }
}

impl std::fmt::Display for AlertSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "NO FACE", "0" and "1" are the strings the native engine returns.
        match s.trim().to_lowercase().as_str() {
            "no_face" | "no face" => Ok(AlertSignal::NoFace),
            "clear" | "0" => Ok(AlertSignal::Clear),
            "alert" | "1" => Ok(AlertSignal::Alert),
            "unavailable" => Ok(AlertSignal::Unavailable),
            _ => Err(format!("unknown alert signal: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_indices_match_native_values() {
        assert_eq!(CameraFacing::Front.index(), 0);
        assert_eq!(CameraFacing::Back.index(), 1);
        assert_eq!(ComputeMode::Cpu.index(), 0);
        assert_eq!(ComputeMode::Gpu.index(), 1);
        assert_eq!(CameraFacing::try_from(1), Ok(CameraFacing::Back));
        assert!(CameraFacing::try_from(2).is_err());
        assert!(ComputeMode::try_from(-1).is_err());
        assert!(ModelId::try_from(-3).is_err());
    }

    #[test]
    fn alert_signal_parses_native_strings() {
        assert_eq!("NO FACE".parse::<AlertSignal>(), Ok(AlertSignal::NoFace));
        assert_eq!("1".parse::<AlertSignal>(), Ok(AlertSignal::Alert));
        assert_eq!("0".parse::<AlertSignal>(), Ok(AlertSignal::Clear));
        assert!("maybe".parse::<AlertSignal>().is_err());
    }

    #[test]
    fn native_text_round_trips() {
        for text in ["NO FACE", "0", "1", "UNAVAILABLE"] {
            let signal: AlertSignal = text.parse().unwrap();
            assert_eq!(signal.native_str(), text);
        }
        assert_eq!(AlertSignal::Alert.native_str(), "1");
    }

    #[test]
    fn selection_builders_keep_other_half() {
        let sel = ModelSelection::new(0usize, ComputeMode::Gpu).with_model(2usize);
        assert_eq!(sel.model, ModelId(2));
        assert_eq!(sel.compute, ComputeMode::Gpu);
        assert_eq!(sel.to_string(), "model 2 on gpu");
    }
}
