//! Output windows and the overlay drawn onto them.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::detector::FaceObservation;

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

/// Full-frame banner drawn over the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Banner {
    /// No model is loaded, so frames pass through undetected.
    Unsupported,
    /// The eyes-closed alert is active.
    Alert,
}

/// A face box as drawn on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceBox {
    /// Normalized box \[x0,y0,x1,y1\] in 0..1.
    pub bbox: [f32; 4],
    pub score: f32,
    pub mean_ear: f32,
}

impl From<&FaceObservation> for FaceBox {
    fn from(face: &FaceObservation) -> Self {
        Self {
            bbox: face.bbox,
            score: face.score,
            mean_ear: face.mean_ear(),
        }
    }
}

impl FaceBox {
    /// Box in pixel coordinates, clamped to the frame; `None` if degenerate.
    pub fn to_pixels(&self, dims: (u32, u32)) -> Option<[u32; 4]> {
        let (w, h) = dims;
        if w == 0 || h == 0 {
            return None;
        }
        let clamp = |v: f32, max: u32| -> u32 { v.max(0.0).min((max - 1) as f32) as u32 };
        let x0 = clamp(self.bbox[0] * w as f32, w);
        let y0 = clamp(self.bbox[1] * h as f32, h);
        let x1 = clamp(self.bbox[2] * w as f32, w);
        let y1 = clamp(self.bbox[3] * h as f32, h);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some([x0, y0, x1, y1])
    }
}

/// Everything the engine draws for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub frame_id: u64,
    pub size: (u32, u32),
    pub faces: Vec<FaceBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
    /// Moving-average frame rate, once enough frames have been seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
}

/// Display target the engine presents overlays to.
pub trait RenderTarget: Send + Sync {
    fn present(&self, overlay: &Overlay);
}

/// Handle to a display surface. Cloning shares the same target.
#[derive(Clone)]
pub struct OutputWindow {
    id: u64,
    width: u32,
    height: u32,
    target: Arc<dyn RenderTarget>,
}

impl OutputWindow {
    pub fn new(width: u32, height: u32, target: Arc<dyn RenderTarget>) -> Self {
        Self {
            id: NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            target,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn present(&self, overlay: &Overlay) {
        self.target.present(overlay);
    }
}

impl fmt::Debug for OutputWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputWindow")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Discards overlays.
#[derive(Debug, Default)]
pub struct NullTarget;

impl RenderTarget for NullTarget {
    fn present(&self, _overlay: &Overlay) {}
}

/// Emits each overlay as a trace event.
#[derive(Debug, Default)]
pub struct TraceTarget;

impl RenderTarget for TraceTarget {
    fn present(&self, overlay: &Overlay) {
        let boxes: Vec<[u32; 4]> = overlay
            .faces
            .iter()
            .filter_map(|face| face.to_pixels(overlay.size))
            .collect();
        tracing::trace!(
            frame = overlay.frame_id,
            faces = boxes.len(),
            banner = ?overlay.banner,
            fps = ?overlay.fps,
            "overlay {:?}",
            boxes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_pixels_clamps_to_frame() {
        let face = FaceBox {
            bbox: [-0.1, 0.25, 1.5, 0.75],
            score: 1.0,
            mean_ear: 0.3,
        };
        assert_eq!(face.to_pixels((100, 40)), Some([0, 10, 99, 30]));
        assert_eq!(face.to_pixels((0, 40)), None);
    }

    #[test]
    fn inverted_box_is_rejected() {
        let face = FaceBox {
            bbox: [0.8, 0.1, 0.2, 0.5],
            score: 1.0,
            mean_ear: 0.3,
        };
        assert_eq!(face.to_pixels((100, 100)), None);
    }

    #[test]
    fn windows_get_distinct_ids() {
        let a = OutputWindow::new(640, 480, Arc::new(NullTarget));
        let b = OutputWindow::new(640, 480, Arc::new(NullTarget));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }
}
