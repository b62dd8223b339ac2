use assert_cmd::Command;
use predicates::prelude::*;

fn reelsmith(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("reelsmith").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("reelsmith.json");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn captions_prints_uniform_srt() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "{}");
    reelsmith(&dir)
        .args(["--config", config.to_str().unwrap()])
        .args(["captions", "--script", "one two three four", "--speech-seconds", "2", "--mode", "words"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1\n00:00:00,000 --> 00:00:00,500\none"))
        .stdout(predicate::str::contains("4\n00:00:01,500 --> 00:00:02,000\nfour"));
}

#[test]
fn captions_json_reports_estimate() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, r#"{ "captions": { "words_per_second": 2.0 } }"#);
    reelsmith(&dir)
        .args(["--config", config.to_str().unwrap()])
        .args(["captions", "--script", "a b c d", "--mode", "phrases", "--words", "2", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"speech_measured\": false"))
        .stdout(predicate::str::contains("\"text\": \"c d\""));
}

#[test]
fn captions_without_script_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "{}");
    reelsmith(&dir)
        .args(["--config", config.to_str().unwrap(), "captions"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no script configured"));
}

#[test]
fn config_validate_flags_bad_backend() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, r#"{ "tts": { "backend": "festival" } }"#);
    reelsmith(&dir)
        .args(["--config", config.to_str().unwrap(), "config", "--validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported backend"));
}

#[test]
fn config_validate_accepts_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "{}");
    reelsmith(&dir)
        .args(["--config", config.to_str().unwrap(), "config", "--validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config OK"));
}

#[test]
fn backends_lists_all_providers() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, r#"{ "cache_dir": "cache" }"#);
    reelsmith(&dir)
        .args(["--config", config.to_str().unwrap(), "backends", "--json"])
        .env_remove("ELEVENLABS_API_KEY")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"gtts\""))
        .stdout(predicate::str::contains("\"elevenlabs\""))
        .stdout(predicate::str::contains("\"piper\""));
}

#[test]
fn speak_rejects_unknown_backend() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, r#"{ "cache_dir": "cache" }"#);
    reelsmith(&dir)
        .args(["--config", config.to_str().unwrap()])
        .args(["speak", "--script", "hello there", "--backend", "festival", "-o", "voice.mp3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown backend: festival"));
    assert!(!dir.path().join("voice.mp3").exists());
}

#[test]
fn doctor_json_reports_tooling() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "{}");
    reelsmith(&dir)
        .args(["--config", config.to_str().unwrap(), "doctor", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ffmpeg\""))
        .stdout(predicate::str::contains("\"ffprobe\""))
        .stdout(predicate::str::contains("\"font\""));
}

#[test]
fn doctor_fails_when_the_font_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, r#"{ "font_path": "/nope/missing.ttf" }"#);
    reelsmith(&dir)
        .args(["--config", config.to_str().unwrap(), "doctor"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Font: not found"))
        .stderr(predicate::str::contains("not ready to render"));
}

#[test]
fn overlay_writes_a_full_frame_png() {
    if reelsmith::overlay::font::resolve_font_path(None).is_err() {
        eprintln!("no system font available; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "{}");
    reelsmith(&dir)
        .args(["--config", config.to_str().unwrap()])
        .args(["overlay", "--text", "Routines reduce stress", "--branding", "@Brain.FuelMedia"])
        .args(["--with-background", "-o", "frames/preview.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overlay written"));

    let png = image::open(dir.path().join("frames/preview.png")).unwrap().to_rgba8();
    assert_eq!(png.dimensions(), (1080, 1920));
    // painted background makes every pixel opaque
    assert_eq!(png.get_pixel(0, 0).0, [15, 15, 15, 255]);
}
