extern crate spark;

use std::fs;
use std::time::Duration;

use spark::prelude::*;

#[test]
fn defaults() {
    let settings = Settings::default();
    assert_eq!(settings.scene.fixed_update_hz, 30);
    assert_eq!(settings.scene.queue_capacity, 256);
    assert_eq!(settings.video.max_texture_units, 16);
    assert_eq!(settings.video.error_color, Color::yellow());

    assert_eq!(Settings::from_json("{}").unwrap(), settings);
}

#[test]
fn partial_documents() {
    let settings = Settings::from_json(
        r#"{
            "scene": { "fixed_update_hz": 60 },
            "video": { "error_color": { "r": 1.0, "g": 0.0, "b": 1.0, "a": 1.0 } }
        }"#,
    )
    .unwrap();

    assert_eq!(settings.scene.fixed_update_hz, 60);
    assert_eq!(settings.scene.fixed_interval(), Duration::from_secs(1) / 60);
    assert_eq!(settings.scene.stop_timeout_ms, 500);
    assert_eq!(settings.video.error_color, Color::new(1.0, 0.0, 1.0, 1.0));
    assert_eq!(settings.video.max_texture_units, 16);
}

#[test]
fn malformed_documents() {
    assert!(Settings::from_json("{ \"scene\": ").is_err());
    assert!(Settings::from_json(r#"{ "scene": { "fixed_update_hz": "fast" } }"#).is_err());
}

#[test]
fn load() {
    let path = std::env::temp_dir().join(format!("spark-settings-{}.json", std::process::id()));
    fs::write(&path, r#"{ "video": { "max_texture_units": 4 } }"#).unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.video.max_texture_units, 4);
    assert_eq!(settings.scene, SceneParams::default());

    fs::remove_file(&path).unwrap();
    assert!(Settings::load(&path).is_err());
}

#[test]
fn video_system_honors_params() {
    let params = VideoParams {
        max_texture_units: 4,
        error_color: Color::new(1.0, 0.0, 1.0, 1.0),
    };

    let video = VideoSystem::headless(params).unwrap();
    assert_eq!(video.params(), &params);
}
