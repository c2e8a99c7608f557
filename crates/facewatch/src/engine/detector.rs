//! Frames, face observations and the detector seam.

use facewatch_protocol::ComputeMode;
use serde::{Deserialize, Serialize};

use super::catalog::ModelSpec;

/// A detected face with the landmarks the alert logic needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    /// Normalized box \[x0,y0,x1,y1\] in 0..1.
    pub bbox: [f32; 4],
    /// Detection confidence.
    #[serde(default = "default_score")]
    pub score: f32,
    /// Eye aspect ratio of the left eye.
    pub ear_left: f32,
    /// Eye aspect ratio of the right eye.
    pub ear_right: f32,
}

fn default_score() -> f32 {
    1.0
}

impl FaceObservation {
    pub fn mean_ear(&self) -> f32 {
        (self.ear_left + self.ear_right) / 2.0
    }
}

/// A camera frame handed to the engine's render path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: u64,
    /// Capture timestamp in milliseconds since the camera opened.
    pub timestamp_ms: u64,
    /// Frame dimensions (width, height).
    pub size: (u32, u32),
    /// Faces annotated on the frame by an upstream stage, if any.
    #[serde(default)]
    pub faces: Vec<FaceObservation>,
}

/// Runs face detection on a frame.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Vec<FaceObservation>;
}

/// Builds a detector once a model's assets have been read.
pub trait DetectorFactory: Send + Sync {
    fn build(&self, spec: &ModelSpec, compute: ComputeMode) -> Box<dyn FaceDetector>;
}

/// Detector that trusts the faces annotated on each frame.
///
/// Used when frames come from a recorded trace whose detections were computed
/// offline; only the score threshold is applied here.
#[derive(Debug, Clone)]
pub struct AnnotatedFrameDetector {
    min_score: f32,
}

impl AnnotatedFrameDetector {
    pub fn new(min_score: f32) -> Self {
        Self { min_score }
    }
}

impl FaceDetector for AnnotatedFrameDetector {
    fn detect(&mut self, frame: &Frame) -> Vec<FaceObservation> {
        frame
            .faces
            .iter()
            .filter(|face| face.score >= self.min_score)
            .copied()
            .collect()
    }
}

/// Factory for [`AnnotatedFrameDetector`].
#[derive(Debug, Clone)]
pub struct AnnotatedDetectorFactory {
    pub min_score: f32,
}

impl Default for AnnotatedDetectorFactory {
    fn default() -> Self {
        Self { min_score: 0.5 }
    }
}

impl DetectorFactory for AnnotatedDetectorFactory {
    fn build(&self, _spec: &ModelSpec, _compute: ComputeMode) -> Box<dyn FaceDetector> {
        Box::new(AnnotatedFrameDetector::new(self.min_score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(score: f32) -> FaceObservation {
        FaceObservation {
            bbox: [0.1, 0.1, 0.4, 0.5],
            score,
            ear_left: 0.3,
            ear_right: 0.2,
        }
    }

    #[test]
    fn annotated_detector_filters_by_score() {
        let frame = Frame {
            id: 7,
            timestamp_ms: 0,
            size: (640, 480),
            faces: vec![face(0.9), face(0.2)],
        };
        let mut detector = AnnotatedFrameDetector::new(0.5);
        let faces = detector.detect(&frame);
        assert_eq!(faces.len(), 1);
        assert!((faces[0].mean_ear() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn frame_parses_without_faces_or_score() {
        let frame: Frame =
            serde_json::from_str(r#"{"id":1,"timestamp_ms":33,"size":[320,240]}"#).unwrap();
        assert!(frame.faces.is_empty());

        let obs: FaceObservation =
            serde_json::from_str(r#"{"bbox":[0,0,1,1],"ear_left":0.3,"ear_right":0.3}"#).unwrap();
        assert_eq!(obs.score, 1.0);
    }
}
