pub mod elevenlabs;
pub mod gtts;
pub mod piper;
pub mod provider;

use crate::audio::{cache::AudioCache, Speech};
use crate::config::{Config, TtsConfig};
use crate::error::PipelineError;
use anyhow::Context;
use provider::TtsBackend;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BACKEND: &str = "gtts";

#[derive(Debug, Serialize)]
pub struct BackendInfo {
    pub name: String,
    pub available: bool,
    pub format: String,
}

#[derive(Debug, Serialize)]
pub struct BackendsInfo {
    pub backends: Vec<BackendInfo>,
    pub cache_dir: Option<PathBuf>,
}

pub fn backend_name(config: &Config, backend_override: &Option<String>) -> String {
    backend_override
        .clone()
        .or_else(|| config.tts.backend.clone())
        .unwrap_or_else(|| DEFAULT_BACKEND.to_string())
}

pub fn synthesize(
    text: &str,
    config: &Config,
    backend_override: &Option<String>,
) -> anyhow::Result<Speech> {
    let backend_name = backend_name(config, backend_override);
    let backend = provider::select_backend(&backend_name)?;
    let format = backend.audio_format();

    let cache_dir = config.default_cache_dir()?;
    let (max_size_bytes, max_entries) = config.cache_limits();
    let cache = AudioCache::new(cache_dir, max_size_bytes, max_entries);
    let cache_key = cache_key(backend.as_ref(), text, &config.tts)?;
    if let Some(bytes) = cache.get(&cache_key, format) {
        tracing::debug!(backend = %backend_name, key = %cache_key, "speech cache hit");
        return Ok(Speech { bytes, format });
    }

    tracing::info!(backend = %backend_name, chars = text.chars().count(), "synthesizing speech");
    let bytes = backend
        .synthesize(text, &config.tts)
        .with_context(|| format!("synthesize with {backend_name}"))?;
    if bytes.is_empty() {
        return Err(PipelineError::EmptySpeech {
            backend: backend_name,
        }
        .into());
    }

    if let Err(err) = cache.put(&cache_key, format, &bytes) {
        tracing::debug!(error = ?err, "cache write failed");
    }

    Ok(Speech { bytes, format })
}

/// Key for `text` spoken by `backend`: the tts config plus whatever the
/// backend resolves from the environment.
pub fn cache_key(backend: &dyn TtsBackend, text: &str, tts: &TtsConfig) -> anyhow::Result<String> {
    let mut params = serde_json::to_string(tts).context("serialize tts config")?;
    params.push('\n');
    params.push_str(&backend.cache_params(tts));
    Ok(AudioCache::key(backend.name(), text, &params))
}

pub fn backends_info(config: &Config) -> anyhow::Result<BackendsInfo> {
    let cache_dir = config.default_cache_dir().ok();

    let mut backends = Vec::new();
    for name in provider::BACKENDS {
        let backend = provider::select_backend(name)?;
        backends.push(BackendInfo {
            name: name.to_string(),
            available: backend.available(&config.tts),
            format: backend.audio_format().extension().to_string(),
        });
    }

    Ok(BackendsInfo {
        backends,
        cache_dir,
    })
}

pub(crate) fn http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::blocking::Client> {
    let mut builder = reqwest::blocking::Client::builder();
    if timeout_seconds > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_seconds));
    }
    builder.build().context("build http client")
}
