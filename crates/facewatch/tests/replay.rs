//! Trace replay through a full session.

mod common;

use std::fmt::Write as _;
use std::fs;
use std::sync::Arc;

use common::{model_assets, window};
use facewatch::alert::AlertConfig;
use facewatch::engine::{InferenceEngine, LocalEngine, LocalEngineConfig, ModelCatalog};
use facewatch::events::MemorySink;
use facewatch::protocol::{AlertSignal, CameraFacing, ComputeMode, ModelId};
use facewatch::replay::{ReplayError, ReplayOptions, load_trace, replay};
use facewatch::session::{SessionConfig, SessionController, SurfaceEvent, UiEvent};

const FAST: ReplayOptions = ReplayOptions {
    realtime: false,
    speed: 1.0,
};

/// 100 ms frames: eyes open for the first second, closed for the next three.
fn drowsy_trace() -> String {
    let mut text = String::from("# synthetic drowsy driver\n");
    for i in 0..40u64 {
        let ear = if i < 10 { 0.4 } else { 0.2 };
        writeln!(
            text,
            r#"{{"id":{i},"timestamp_ms":{},"size":[640,480],"faces":[{{"bbox":[0.3,0.2,0.7,0.8],"ear_left":{ear},"ear_right":{ear}}}]}}"#,
            i * 100
        )
        .unwrap();
    }
    text
}

fn write_trace(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("trace.jsonl");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_session_replay_raises_alert() {
    let dir = tempfile::tempdir().unwrap();
    let frames = load_trace(&write_trace(&dir, &drowsy_trace())).unwrap();
    assert_eq!(frames.len(), 40);

    let engine = Arc::new(LocalEngine::new(
        LocalEngineConfig::default(),
        ModelCatalog::default(),
    ));
    let sink = Arc::new(MemorySink::new());
    let mut controller = SessionController::new(
        engine.clone(),
        Arc::new(model_assets()),
        SessionConfig::default(),
        AlertConfig::default(),
    )
    .with_event_sink(sink.clone());

    controller.handle(UiEvent::HostCreated);
    controller.handle(UiEvent::Surface(SurfaceEvent::Created));
    controller.handle(UiEvent::Surface(SurfaceEvent::Changed(window(640, 480))));

    let stats = replay(&engine, &frames, FAST);

    assert_eq!(stats.frames, 40);
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.unsupported_frames, 0);
    // Eyes close at 1000 ms (last open frame at 900 ms); alert from 3000 ms on.
    assert_eq!(stats.alert_frames, 10);
    assert_eq!(stats.final_signal, Some(AlertSignal::Alert));
    assert!(stats.last_fps.is_some());

    controller.handle(UiEvent::Surface(SurfaceEvent::Destroyed));
    controller.handle(UiEvent::HostDestroyed);

    assert_eq!(engine.alert_trigger(), AlertSignal::Unavailable);
    assert_eq!(
        sink.names(),
        vec![
            "model.loaded",
            "camera.opened",
            "poller.started",
            "window.bound",
            "poller.stopped",
            "camera.closed",
        ]
    );
}

#[test]
fn test_replay_without_model_draws_unsupported() {
    let frames = facewatch::replay::parse_trace(&drowsy_trace()).unwrap();
    let engine = LocalEngine::new(LocalEngineConfig::default(), ModelCatalog::default());
    engine.open_camera(CameraFacing::Front).unwrap();

    let stats = replay(&engine, &frames, FAST);

    assert_eq!(stats.unsupported_frames, 40);
    assert_eq!(stats.alert_frames, 0);
    assert_eq!(stats.final_signal, Some(AlertSignal::NoFace));
}

#[test]
fn test_replay_with_closed_camera_drops_everything() {
    let frames = facewatch::replay::parse_trace(&drowsy_trace()).unwrap();
    let engine = LocalEngine::new(LocalEngineConfig::default(), ModelCatalog::default());
    engine
        .load_model(&model_assets(), ModelId(0), ComputeMode::Cpu)
        .unwrap();

    let stats = replay(&engine, &frames, FAST);

    assert_eq!(stats.frames, 40);
    assert_eq!(stats.dropped, 40);
    assert_eq!(stats.final_signal, Some(AlertSignal::Unavailable));
    assert_eq!(engine.frames_rendered(), 0);
}

#[test]
fn test_missing_trace_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_trace(&dir.path().join("absent.jsonl")).unwrap_err();
    assert!(matches!(err, ReplayError::Io(_)));
}
