use crate::audio::AudioFormat;
use crate::config::TtsConfig;
use crate::tts::provider::TtsBackend;
use anyhow::{bail, Context};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Local `piper` binary: text on stdin, WAV written to a temp file.
pub struct PiperBackend;

impl PiperBackend {
    pub fn new() -> Self {
        Self
    }

    fn binary(config: &TtsConfig) -> PathBuf {
        config
            .piper
            .binary
            .clone()
            .unwrap_or_else(|| PathBuf::from("piper"))
    }
}

impl Default for PiperBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TtsBackend for PiperBackend {
    fn name(&self) -> &str {
        "piper"
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Wav
    }

    fn synthesize(&self, text: &str, config: &TtsConfig) -> anyhow::Result<Vec<u8>> {
        let Some(model) = &config.piper.model else {
            bail!("piper backend requires tts.piper.model to be set");
        };

        let out = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .context("create piper output file")?;

        let binary = Self::binary(config);
        let mut child = Command::new(&binary)
            .arg("--model")
            .arg(model)
            .arg("--output_file")
            .arg(out.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn {}", binary.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .context("write text to piper")?;
        }

        let output = child.wait_with_output().context("wait for piper")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("piper exited with status {}: {}", output.status, stderr.trim());
        }

        std::fs::read(out.path()).context("read piper output")
    }

    fn available(&self, config: &TtsConfig) -> bool {
        config.piper.model.as_ref().is_some_and(|m| m.exists())
            && Command::new(Self::binary(config))
                .arg("--help")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .is_ok()
    }

    fn cache_params(&self, config: &TtsConfig) -> String {
        format!("binary={}", Self::binary(config).display())
    }
}
