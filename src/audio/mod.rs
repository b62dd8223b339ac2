pub mod cache;
pub mod probe;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }
}

/// Synthesized speech as returned by a backend or the cache.
#[derive(Debug, Clone)]
pub struct Speech {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}
