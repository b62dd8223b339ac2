use crate::audio::AudioFormat;
use crate::config::TtsConfig;
use crate::tts::provider::TtsBackend;
use anyhow::{bail, Context};
use reqwest::header::ACCEPT;
use serde::Serialize;

pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";
pub const VOICE_ID_ENV: &str = "ELEVENLABS_VOICE_ID";

const API_BASE: &str = "https://api.elevenlabs.io/v1/text-to-speech";

pub struct ElevenLabsBackend;

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

impl ElevenLabsBackend {
    pub fn new() -> Self {
        Self
    }

    fn api_key() -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    fn voice_id(config: &TtsConfig) -> Option<String> {
        config
            .elevenlabs
            .voice_id
            .clone()
            .or_else(|| std::env::var(VOICE_ID_ENV).ok())
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }
}

impl Default for ElevenLabsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TtsBackend for ElevenLabsBackend {
    fn name(&self) -> &str {
        "elevenlabs"
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    fn synthesize(&self, text: &str, config: &TtsConfig) -> anyhow::Result<Vec<u8>> {
        let Some(api_key) = Self::api_key() else {
            bail!("elevenlabs backend requires {API_KEY_ENV} to be set");
        };
        let Some(voice_id) = Self::voice_id(config) else {
            bail!("elevenlabs backend requires {VOICE_ID_ENV} or tts.elevenlabs.voice_id");
        };

        let body = SpeechRequest {
            text,
            model_id: &config.elevenlabs.model_id,
            voice_settings: VoiceSettings {
                stability: config.elevenlabs.stability,
                similarity_boost: config.elevenlabs.similarity_boost,
            },
        };

        let client = super::http_client(config.timeout_seconds)?;
        let response = client
            .post(format!("{API_BASE}/{voice_id}"))
            .query(&[("output_format", "mp3_44100_128")])
            .header("xi-api-key", api_key)
            .header(ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .context("request elevenlabs speech")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            bail!("elevenlabs returned {status}: {}", detail.trim());
        }

        let bytes = response.bytes().context("read elevenlabs audio")?;
        Ok(bytes.to_vec())
    }

    fn available(&self, config: &TtsConfig) -> bool {
        Self::api_key().is_some() && Self::voice_id(config).is_some()
    }

    fn cache_params(&self, config: &TtsConfig) -> String {
        format!("voice={}", Self::voice_id(config).unwrap_or_default())
    }
}
