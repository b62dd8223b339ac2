use crate::audio::AudioFormat;
use crate::config::TtsConfig;
use anyhow::bail;

use super::{elevenlabs::ElevenLabsBackend, gtts::GoogleTranslateBackend, piper::PiperBackend};

pub const BACKENDS: [&str; 3] = ["gtts", "elevenlabs", "piper"];

pub trait TtsBackend: Send + Sync {
    fn name(&self) -> &str;
    fn audio_format(&self) -> AudioFormat;
    fn synthesize(&self, text: &str, config: &TtsConfig) -> anyhow::Result<Vec<u8>>;
    /// Whether the backend has what it needs (credentials, binaries) right now.
    fn available(&self, config: &TtsConfig) -> bool;
    /// Settings resolved outside the config (environment, PATH) that change
    /// the audio. Folded into the cache key.
    fn cache_params(&self, _config: &TtsConfig) -> String {
        String::new()
    }
}

pub fn select_backend(name: &str) -> anyhow::Result<Box<dyn TtsBackend>> {
    match name {
        "gtts" => Ok(Box::new(GoogleTranslateBackend::new())),
        "elevenlabs" => Ok(Box::new(ElevenLabsBackend::new())),
        "piper" => Ok(Box::new(PiperBackend::new())),
        _ => bail!("unknown backend: {name}"),
    }
}
