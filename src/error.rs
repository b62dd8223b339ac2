use std::path::PathBuf;

/// Failures a caller may want to tell apart. Everything else travels as
/// `anyhow::Error` with context attached.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("ffmpeg is required for MP4 encoding, but was not found on PATH")]
    FfmpegMissing,

    #[error("ffmpeg exited with status {status}: {stderr}")]
    FfmpegFailed { status: String, stderr: String },

    #[error("output {} is only {bytes} bytes (expected at least {min})", path.display())]
    OutputTooSmall { path: PathBuf, bytes: u64, min: u64 },

    #[error("no usable font found (tried: {tried})")]
    FontNotFound { tried: String },

    #[error("speech backend {backend} returned no audio")]
    EmptySpeech { backend: String },
}
