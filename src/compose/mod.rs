pub mod encoder;
pub mod timeline;

use crate::audio::probe;
use crate::background::{self, Backdrop};
use crate::captions::{self, srt};
use crate::config::Config;
use crate::error::PipelineError;
use crate::overlay::{font, OverlayRenderer};
use crate::script::Script;
use crate::tts;
use anyhow::Context;
use chrono::{DateTime, Utc};
use encoder::{EncodeConfig, FfmpegEncoder, VideoInput};
use image::RgbaImage;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use timeline::Timeline;

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub backend: Option<String>,
    pub write_srt: bool,
    pub write_manifest: bool,
    pub keep_work: bool,
}

#[derive(Debug, Serialize)]
pub struct RenderReport {
    pub output: PathBuf,
    pub bytes: u64,
    pub backend: String,
    pub background: String,
    pub speech_seconds: f64,
    pub speech_measured: bool,
    pub video_seconds: f64,
    pub frames: u64,
    pub cues: usize,
    pub work_dir: Option<PathBuf>,
    pub srt: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    created_at: DateTime<Utc>,
    script: &'a str,
    backend: &'a str,
    background: &'a str,
    width: u32,
    height: u32,
    fps: u32,
    timeline: &'a Timeline,
}

/// Scratch space for intermediate files. Removed on drop unless kept.
pub enum Workspace {
    Temp(TempDir),
    Kept(PathBuf),
}

impl Workspace {
    pub fn create(dir: Option<&Path>, keep: bool) -> anyhow::Result<Self> {
        if let Some(dir) = dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("create work dir {}", dir.display()))?;
            return Ok(Self::Kept(dir.to_path_buf()));
        }

        let temp = tempfile::Builder::new()
            .prefix("reelsmith-")
            .tempdir()
            .context("create temp work dir")?;
        if keep {
            return Ok(Self::Kept(temp.keep()));
        }
        Ok(Self::Temp(temp))
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Temp(dir) => dir.path(),
            Self::Kept(path) => path,
        }
    }

    pub fn kept_path(&self) -> Option<PathBuf> {
        match self {
            Self::Temp(_) => None,
            Self::Kept(path) => Some(path.clone()),
        }
    }
}

pub fn render(config: &Config, options: &RenderOptions) -> anyhow::Result<RenderReport> {
    config.validate().context("invalid config")?;
    if !encoder::is_ffmpeg_on_path() {
        return Err(PipelineError::FfmpegMissing.into());
    }

    // 1. script
    let script = Script::from_config(&config.script)?;
    tracing::info!(words = script.word_count(), "script ready");

    let workspace = Workspace::create(config.work_dir.as_deref(), options.keep_work)?;
    tracing::debug!(work_dir = %workspace.path().display(), "work dir");

    // 2. speech
    let backend = tts::backend_name(config, &options.backend);
    let speech = tts::synthesize(script.text(), config, &options.backend)?;
    let voice_path = workspace
        .path()
        .join(format!("voice.{}", speech.format.extension()));
    fs::write(&voice_path, &speech.bytes)
        .with_context(|| format!("write {}", voice_path.display()))?;

    let measured = probe::speech_duration(&voice_path, speech.format);
    if measured.is_none() {
        tracing::warn!("could not measure speech length; estimating from word count");
    }
    let timeline = timeline::plan(&script, measured, &config.video, &config.captions);
    tracing::info!(
        speech_seconds = timeline.speech_seconds,
        video_seconds = timeline.video_seconds,
        cues = timeline.cues.len(),
        "timeline planned"
    );

    // 3. background
    let video = &config.video;
    let backdrop = background::resolve(
        &config.background,
        video.width,
        video.height,
        workspace.path(),
    )?;

    // 4. overlays
    let font = font::load_font(config.font_path.as_deref())?;
    let renderer = OverlayRenderer::new(
        font,
        video.width,
        video.height,
        &config.captions,
        &config.branding,
    );

    // 5 + 6. composite and encode
    let encode = EncodeConfig {
        width: video.width,
        height: video.height,
        fps: video.fps,
        duration_seconds: timeline.video_seconds,
        out_path: config.output.clone(),
        overwrite: true,
        video_codec: video.video_codec.clone(),
        audio_codec: video.audio_codec.clone(),
        preset: video.preset.clone(),
        crf: video.crf,
        min_output_bytes: video.min_output_bytes,
    };
    let input = match &backdrop {
        Backdrop::Painted(_) => VideoInput::Piped,
        Backdrop::Still(path) => VideoInput::Still(path),
        Backdrop::Footage(path) => VideoInput::Footage(path),
    };

    tracing::info!(output = %config.output.display(), frames = timeline.frames, "encoding");
    let mut encoder = FfmpegEncoder::spawn(encode, input, &voice_path)?;
    stream_frames(&mut encoder, &renderer, &backdrop, &timeline, video.fps)?;
    tracing::debug!(frames = encoder.frames_written(), "all frames sent");
    let bytes = encoder.finish()?;
    tracing::info!(output = %config.output.display(), bytes, "video written");

    // sidecars
    let srt_path = if options.write_srt {
        let path = config.output.with_extension("srt");
        fs::write(&path, srt::to_srt(&timeline.cues))
            .with_context(|| format!("write {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    let background_desc = backdrop.describe();
    let manifest_path = if options.write_manifest {
        let path = config.output.with_extension("json");
        let manifest = Manifest {
            created_at: Utc::now(),
            script: script.text(),
            backend: &backend,
            background: &background_desc,
            width: video.width,
            height: video.height,
            fps: video.fps,
            timeline: &timeline,
        };
        fs::write(&path, serde_json::to_string_pretty(&manifest)?)
            .with_context(|| format!("write {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    Ok(RenderReport {
        output: config.output.clone(),
        bytes,
        backend,
        background: background_desc,
        speech_seconds: timeline.speech_seconds,
        speech_measured: timeline.speech_measured,
        video_seconds: timeline.video_seconds,
        frames: timeline.frames,
        cues: timeline.cues.len(),
        work_dir: workspace.kept_path(),
        srt: srt_path,
        manifest: manifest_path,
    })
}

/// Writes every frame of the clip. Overlay layers are rebuilt only when the
/// active cue changes.
fn stream_frames(
    encoder: &mut FfmpegEncoder,
    renderer: &OverlayRenderer,
    backdrop: &Backdrop,
    timeline: &Timeline,
    fps: u32,
) -> anyhow::Result<()> {
    let mut layer_state: Option<Option<usize>> = None;
    let mut layer = renderer.blank();
    let mut frame = RgbaImage::new(layer.width(), layer.height());
    let report_every = u64::from(fps.max(1)) * 10;

    for index in 0..timeline.frames {
        let t = index as f64 / f64::from(fps);
        let active = captions::cue_at(&timeline.cues, t);
        if layer_state != Some(active) {
            layer = renderer.compose(active.map(|i| timeline.cues[i].text.as_str()));
            layer_state = Some(active);
        }

        match backdrop {
            Backdrop::Painted(painter) => {
                painter.paint(&mut frame, t);
                image::imageops::overlay(&mut frame, &layer, 0, 0);
                encoder.encode_frame(&frame)?;
            }
            Backdrop::Still(_) | Backdrop::Footage(_) => encoder.encode_frame(&layer)?,
        }

        if index > 0 && index % report_every == 0 {
            tracing::debug!(frame = index, total = timeline.frames, "encoding progress");
        }
    }

    Ok(())
}

/// Captions for a script without synthesizing or encoding anything.
pub fn plan_captions(
    config: &Config,
    script: &Script,
    speech_seconds: Option<f64>,
) -> Timeline {
    timeline::plan(script, speech_seconds, &config.video, &config.captions)
}
