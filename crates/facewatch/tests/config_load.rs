//! Configuration layering tests.

use std::fs;

use facewatch::config::{AppConfig, write_default_config};
use facewatch::protocol::{CameraFacing, ComputeMode, ModelId};
use facewatch::session::ReloadPolicy;

fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::load_with_env(&dir.path().join("config.toml"), env(&[])).unwrap();

    assert_eq!(config.profile, "default");
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.session.facing, CameraFacing::Front);
    assert_eq!(config.session.selection.model, ModelId(0));
    assert_eq!(config.session.reload, ReloadPolicy::InPlace);
    assert!(config.alert.enabled);
    assert!(config.alert.require_open_camera);
    assert!(!config.alert.only_changes);
    assert_eq!(config.alert.interval_ms, 200);
    assert_eq!(config.engine.gpu_count, 0);
    assert!(config.assets_dir().unwrap().is_none());
}

#[test]
fn test_file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[session]
facing = "back"
reload = "close_and_reopen"

[session.selection]
model = 2
compute = "gpu"

[alert]
interval_ms = 500
require_open_camera = false

[engine]
gpu_count = 1

[assets]
dir = "/opt/facewatch"
"#,
    )
    .unwrap();

    let config = AppConfig::load_with_env(&path, env(&[])).unwrap();

    assert_eq!(config.session.facing, CameraFacing::Back);
    assert_eq!(config.session.reload, ReloadPolicy::CloseAndReopen);
    assert_eq!(config.session.selection.model, ModelId(2));
    assert_eq!(config.session.selection.compute, ComputeMode::Gpu);
    assert_eq!(config.alert.interval_ms, 500);
    assert!(!config.alert.require_open_camera);
    assert!(config.alert.enabled);
    assert_eq!(config.engine.gpu_count, 1);
    assert_eq!(
        config.assets_dir().unwrap().unwrap(),
        std::path::PathBuf::from("/opt/facewatch")
    );
}

#[test]
fn test_environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[alert]\ninterval_ms = 500\n").unwrap();

    let config = AppConfig::load_with_env(
        &path,
        env(&[
            ("FACEWATCH__ALERT__INTERVAL_MS", "50"),
            ("FACEWATCH__LOGGING__LEVEL", "debug"),
        ]),
    )
    .unwrap();

    assert_eq!(config.alert.interval_ms, 50);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_zero_poll_interval_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let err = AppConfig::load_with_env(&path, env(&[("FACEWATCH__ALERT__INTERVAL_MS", "0")]))
        .unwrap_err();

    assert!(err.to_string().contains("interval_ms"), "{err}");
}

#[test]
fn test_default_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    write_default_config(&path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# Configuration for facewatch"));

    let config = AppConfig::load_with_env(&path, env(&[])).unwrap();
    assert_eq!(config.profile, "default");
    assert_eq!(config.alert.interval_ms, 200);
    assert_eq!(config.engine.facings, vec![CameraFacing::Front, CameraFacing::Back]);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[alert\ninterval_ms = ").unwrap();

    assert!(AppConfig::load_with_env(&path, env(&[])).is_err());
}
