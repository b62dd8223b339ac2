use crate::error::PipelineError;
use anyhow::{bail, Context};
use image::RgbaImage;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration_seconds: f64,
    pub out_path: PathBuf,
    pub overwrite: bool,
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    pub crf: u8,
    pub min_output_bytes: u64,
}

/// Where the bottom video layer comes from.
#[derive(Clone, Copy, Debug)]
pub enum VideoInput<'a> {
    /// Full opaque frames piped from us.
    Piped,
    /// Looped still image; our piped frames are transparent overlays.
    Still(&'a Path),
    /// Looped video clip; our piped frames are transparent overlays.
    Footage(&'a Path),
}

impl EncodeConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("encode width/height must be non-zero");
        }
        if self.fps == 0 {
            bail!("encode fps must be non-zero");
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            bail!("encode width/height must be even (required for yuv420p mp4 output)");
        }
        if !(self.duration_seconds.is_finite() && self.duration_seconds > 0.0) {
            bail!("encode duration must be positive");
        }
        Ok(())
    }

    fn size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Frames needed to cover `duration_seconds` at `fps`, never fewer than one.
pub fn frame_count(duration_seconds: f64, fps: u32) -> u64 {
    (duration_seconds * f64::from(fps)).ceil().max(1.0) as u64
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

pub fn build_ffmpeg_args(cfg: &EncodeConfig, input: VideoInput<'_>, audio: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |items: &[&str]| args.extend(items.iter().map(OsString::from));

    push(&[if cfg.overwrite { "-y" } else { "-n" }]);
    push(&["-loglevel", "error", "-nostats"]);

    let fps = cfg.fps.to_string();
    let size = cfg.size();
    let pipe = ["-f", "rawvideo", "-pix_fmt", "rgba", "-s", size.as_str(), "-r", fps.as_str(), "-i", "pipe:0"];

    let (audio_index, video_map) = match input {
        VideoInput::Piped => {
            args.extend(pipe.iter().map(OsString::from));
            (1, "0:v:0".to_string())
        }
        VideoInput::Still(path) | VideoInput::Footage(path) => {
            if matches!(input, VideoInput::Still(_)) {
                args.extend(["-loop", "1", "-framerate", fps.as_str()].iter().map(OsString::from));
            } else {
                args.extend(["-stream_loop", "-1"].iter().map(OsString::from));
            }
            args.push("-i".into());
            args.push(path.into());
            args.extend(pipe.iter().map(OsString::from));
            let filter = format!(
                "[0:v]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},setsar=1,fps={fps}[bg];\
                 [bg][1:v]overlay=0:0:format=auto[v]",
                w = cfg.width,
                h = cfg.height,
            );
            args.push("-filter_complex".into());
            args.push(filter.into());
            (2, "[v]".to_string())
        }
    };

    args.push("-i".into());
    args.push(audio.into());

    let audio_map = format!("{audio_index}:a:0");
    let crf = cfg.crf.to_string();
    let duration = format!("{:.3}", cfg.duration_seconds);
    args.extend(
        [
            "-map", video_map.as_str(), "-map", audio_map.as_str(),
            "-c:v", cfg.video_codec.as_str(), "-preset", cfg.preset.as_str(), "-crf", crf.as_str(),
            "-pix_fmt", "yuv420p", "-r", fps.as_str(),
            "-c:a", cfg.audio_codec.as_str(), "-b:a", "192k",
            "-t", duration.as_str(),
            "-movflags", "+faststart",
        ]
        .iter()
        .map(OsString::from),
    );
    args.push(cfg.out_path.as_os_str().to_owned());
    args
}

/// Streams RGBA frames into a system `ffmpeg` process.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    frames_written: u64,
}

impl FfmpegEncoder {
    pub fn spawn(cfg: EncodeConfig, input: VideoInput<'_>, audio: &Path) -> anyhow::Result<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            bail!("output file '{}' already exists", cfg.out_path.display());
        }

        if !is_ffmpeg_on_path() {
            return Err(PipelineError::FfmpegMissing.into());
        }

        let args = build_ffmpeg_args(&cfg, input, audio);
        tracing::debug!(args = ?args, "spawning ffmpeg");

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("failed to spawn ffmpeg (is it installed and on PATH?)")?;

        let stdin = child.stdin.take().context("failed to open ffmpeg stdin")?;

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
            frames_written: 0,
        })
    }

    pub fn encode_frame(&mut self, frame: &RgbaImage) -> anyhow::Result<()> {
        if frame.width() != self.cfg.width || frame.height() != self.cfg.height {
            bail!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.cfg.width,
                self.cfg.height
            );
        }

        let Some(stdin) = self.stdin.as_mut() else {
            bail!("ffmpeg encoder is already finalized");
        };

        if let Err(err) = stdin.write_all(frame.as_raw()) {
            drop(self.stdin.take());
            let _ = self.child.wait();
            let stderr = self.drain_stderr();
            return Err(anyhow::Error::new(err).context(format!(
                "failed to write frame {} to ffmpeg: {}",
                self.frames_written,
                stderr.trim()
            )));
        }

        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Closes the pipe, waits for ffmpeg, and checks the output looks like a
    /// real video. Returns the output size in bytes.
    pub fn finish(mut self) -> anyhow::Result<u64> {
        drop(self.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .context("failed to wait for ffmpeg to finish")?;

        if !output.status.success() {
            return Err(PipelineError::FfmpegFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        check_output_size(&self.cfg.out_path, self.cfg.min_output_bytes)
    }

    fn drain_stderr(&mut self) -> String {
        let mut buf = String::new();
        if let Some(mut stderr) = self.child.stderr.take() {
            let _ = stderr.read_to_string(&mut buf);
        }
        buf
    }
}

pub fn check_output_size(path: &Path, min_bytes: u64) -> anyhow::Result<u64> {
    let bytes = std::fs::metadata(path)
        .with_context(|| format!("stat output {}", path.display()))?
        .len();
    if bytes < min_bytes {
        return Err(PipelineError::OutputTooSmall {
            path: path.to_path_buf(),
            bytes,
            min: min_bytes,
        }
        .into());
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> EncodeConfig {
        EncodeConfig {
            width: 1080,
            height: 1920,
            fps: 30,
            duration_seconds: 12.5,
            out_path: PathBuf::from("out/short.mp4"),
            overwrite: true,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            min_output_bytes: 1024,
        }
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn config_validation_catches_bad_values() {
        assert!(EncodeConfig { width: 0, ..cfg() }.validate().is_err());
        assert!(EncodeConfig { width: 1081, ..cfg() }.validate().is_err());
        assert!(EncodeConfig { fps: 0, ..cfg() }.validate().is_err());
        assert!(EncodeConfig { duration_seconds: 0.0, ..cfg() }.validate().is_err());
        assert!(cfg().validate().is_ok());
    }

    #[test]
    fn frame_count_rounds_up() {
        assert_eq!(frame_count(12.5, 30), 375);
        assert_eq!(frame_count(1.01, 30), 31);
        assert_eq!(frame_count(0.001, 30), 1);
    }

    #[test]
    fn piped_args_map_pipe_and_audio() {
        let args = strings(&build_ffmpeg_args(&cfg(), VideoInput::Piped, Path::new("voice.mp3")));
        assert_eq!(args[0], "-y");
        assert!(args.windows(2).any(|w| w == ["-i", "pipe:0"]));
        assert!(args.windows(2).any(|w| w == ["-i", "voice.mp3"]));
        assert!(args.windows(2).any(|w| w == ["-map", "0:v:0"]));
        assert!(args.windows(2).any(|w| w == ["-map", "1:a:0"]));
        assert!(args.windows(2).any(|w| w == ["-t", "12.500"]));
        assert!(!args.iter().any(|a| a == "-filter_complex"));
        assert_eq!(args.last().map(String::as_str), Some("out/short.mp4"));
    }

    #[test]
    fn footage_args_overlay_pipe_on_looped_clip() {
        let args = strings(&build_ffmpeg_args(
            &cfg(),
            VideoInput::Footage(Path::new("bg.mp4")),
            Path::new("voice.wav"),
        ));
        let clip = args.iter().position(|a| a == "bg.mp4").unwrap();
        let pipe = args.iter().position(|a| a == "pipe:0").unwrap();
        assert!(clip < pipe);
        assert_eq!(args[clip - 3], "-stream_loop");
        let filter_at = args.iter().position(|a| a == "-filter_complex").unwrap();
        assert!(args[filter_at + 1].contains("crop=1080:1920"));
        assert!(args[filter_at + 1].contains("[bg][1:v]overlay"));
        assert!(args.windows(2).any(|w| w == ["-map", "[v]"]));
        assert!(args.windows(2).any(|w| w == ["-map", "2:a:0"]));
    }

    #[test]
    fn still_args_loop_image() {
        let args = strings(&build_ffmpeg_args(
            &cfg(),
            VideoInput::Still(Path::new("bg.png")),
            Path::new("voice.mp3"),
        ));
        assert!(args.windows(2).any(|w| w == ["-loop", "1"]));
        assert!(!args.iter().any(|a| a == "-stream_loop"));
    }

    #[test]
    fn small_output_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.mp4");
        std::fs::write(&path, [0u8; 10]).unwrap();
        let err = check_output_size(&path, 100).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::OutputTooSmall { bytes: 10, min: 100, .. })
        ));
        assert_eq!(check_output_size(&path, 10).unwrap(), 10);
    }
}
