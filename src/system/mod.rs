use crate::audio::probe;
use crate::compose::encoder;
use crate::config::Config;
use crate::overlay::font;
use crate::tts::elevenlabs;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub ffmpeg: bool,
    pub ffprobe: bool,
    pub font: Option<PathBuf>,
    pub elevenlabs_key: bool,
    pub elevenlabs_voice: bool,
}

impl SystemInfo {
    /// Problems that would stop `render` from finishing.
    pub fn blockers(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.ffmpeg {
            out.push("ffmpeg not found on PATH".to_string());
        }
        if self.font.is_none() {
            out.push("no usable font; set font_path in the config".to_string());
        }
        out
    }
}

pub fn detect(config: &Config) -> SystemInfo {
    let font = font::resolve_font_path(config.font_path.as_deref()).ok();
    let env_set = |name: &str| std::env::var(name).is_ok_and(|v| !v.trim().is_empty());

    SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        ffmpeg: encoder::is_ffmpeg_on_path(),
        ffprobe: probe::is_ffprobe_on_path(),
        font,
        elevenlabs_key: env_set(elevenlabs::API_KEY_ENV),
        elevenlabs_voice: config.tts.elevenlabs.voice_id.is_some()
            || env_set(elevenlabs::VOICE_ID_ENV),
    }
}
