use crate::background::BackgroundConfig;
use crate::captions::CaptionMode;
use anyhow::{bail, Context};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub script: ScriptConfig,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub tts: TtsConfig,
    #[serde(default)]
    pub captions: CaptionConfig,
    #[serde(default)]
    pub branding: BrandingConfig,
    #[serde(default)]
    pub background: BackgroundConfig,
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub cache_max_mb: Option<u64>,
    #[serde(default)]
    pub cache_max_entries: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScriptConfig {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Fixed clip length. When unset the clip follows the speech.
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default = "default_tail_seconds")]
    pub tail_seconds: f64,
    #[serde(default = "default_video_codec")]
    pub video_codec: String,
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default = "default_crf")]
    pub crf: u8,
    #[serde(default = "default_min_output_bytes")]
    pub min_output_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(default = "default_backend")]
    pub backend: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_tld")]
    pub tld: String,
    #[serde(default)]
    pub slow: bool,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub elevenlabs: ElevenLabsConfig,
    #[serde(default)]
    pub piper: PiperConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevenLabsConfig {
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default = "default_elevenlabs_model")]
    pub model_id: String,
    #[serde(default = "default_stability")]
    pub stability: f32,
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PiperConfig {
    #[serde(default)]
    pub binary: Option<PathBuf>,
    #[serde(default)]
    pub model: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    #[serde(default)]
    pub mode: CaptionMode,
    #[serde(default = "default_words_per_caption")]
    pub words_per_caption: usize,
    #[serde(default = "default_caption_font_size")]
    pub font_size: f32,
    #[serde(default = "Color::white")]
    pub color: Color,
    #[serde(default)]
    pub stroke_color: Option<Color>,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,
    /// Fraction of the frame height the caption block is centered on.
    #[serde(default = "default_vertical_anchor")]
    pub vertical_anchor: f32,
    #[serde(default)]
    pub uppercase: bool,
    /// Speaking rate used when the audio duration cannot be probed.
    #[serde(default = "default_words_per_second")]
    pub words_per_second: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingConfig {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_branding_font_size")]
    pub font_size: f32,
    #[serde(default = "Color::white")]
    pub color: Color,
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin: u32,
}

/// An RGBA color written as `#rrggbb` or `#rrggbbaa` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let hex = raw.trim().trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            bail!("color must be #rrggbb or #rrggbbaa, got {raw:?}");
        }
        let mut out = [255u8; 4];
        for (i, slot) in out.iter_mut().enumerate().take(hex.len() / 2) {
            *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .with_context(|| format!("invalid hex digits in color {raw:?}"))?;
        }
        Ok(Self(out))
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl Config {
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let project = Self::project_path();
        if project.exists() {
            return Self::load_from_path(&project);
        }

        if let Ok(path) = Self::default_path() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config at {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parse config at {}", path.display()))?;
        Ok(config)
    }

    pub fn init_default() -> anyhow::Result<PathBuf> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config = Self::default();
        fs::write(&path, serde_json::to_string_pretty(&config)?)?;
        Ok(path)
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        let base = BaseDirs::new().context("unable to resolve home directory")?;
        Ok(base.config_dir().join("reelsmith").join("config.json"))
    }

    pub fn default_cache_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        let base = BaseDirs::new().context("unable to resolve home directory")?;
        Ok(base.cache_dir().join("reelsmith"))
    }

    pub fn cache_limits(&self) -> (u64, usize) {
        let max_mb = self.cache_max_mb.unwrap_or(200);
        let max_entries = self.cache_max_entries.unwrap_or(500);
        (max_mb * 1024 * 1024, max_entries)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let video = &self.video;
        if video.width == 0 || video.height == 0 {
            bail!("video.width and video.height must be greater than 0");
        }
        if video.width % 2 != 0 || video.height % 2 != 0 {
            bail!("video.width and video.height must be even for yuv420p output");
        }
        if video.fps == 0 || video.fps > 120 {
            bail!("video.fps must be between 1 and 120");
        }
        if let Some(duration) = video.duration_seconds {
            if !(duration.is_finite() && duration > 0.0) {
                bail!("video.duration_seconds must be a positive number");
            }
        }
        if !(video.tail_seconds.is_finite() && video.tail_seconds >= 0.0) {
            bail!("video.tail_seconds must not be negative");
        }
        if video.crf > 51 {
            bail!("video.crf must be between 0 and 51");
        }

        if let Some(backend) = &self.tts.backend {
            match backend.as_str() {
                "gtts" | "elevenlabs" | "piper" => {}
                _ => bail!("unsupported backend: {backend}"),
            }
        }
        if self.tts.backend.as_deref() == Some("piper") && self.tts.piper.model.is_none() {
            bail!("piper backend requires tts.piper.model to be set");
        }
        for (name, value) in [
            ("stability", self.tts.elevenlabs.stability),
            ("similarity_boost", self.tts.elevenlabs.similarity_boost),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("tts.elevenlabs.{name} must be between 0.0 and 1.0");
            }
        }

        let captions = &self.captions;
        if captions.words_per_caption == 0 {
            bail!("captions.words_per_caption must be greater than 0");
        }
        if captions.font_size <= 0.0 || self.branding.font_size <= 0.0 {
            bail!("font sizes must be greater than 0");
        }
        if captions.max_width == 0 || captions.max_width > video.width {
            bail!("captions.max_width must be between 1 and video.width");
        }
        if !(0.0..=1.0).contains(&captions.vertical_anchor) {
            bail!("captions.vertical_anchor must be between 0.0 and 1.0");
        }
        if captions.line_spacing < 0.5 {
            bail!("captions.line_spacing must be at least 0.5");
        }
        if !(captions.words_per_second.is_finite() && captions.words_per_second > 0.0) {
            bail!("captions.words_per_second must be greater than 0");
        }
        if self.branding.bottom_margin >= video.height {
            bail!("branding.bottom_margin must be smaller than video.height");
        }

        if let Some(max_mb) = self.cache_max_mb {
            if max_mb == 0 {
                bail!("cache_max_mb must be greater than 0");
            }
        }
        if let Some(max_entries) = self.cache_max_entries {
            if max_entries == 0 {
                bail!("cache_max_entries must be greater than 0");
            }
        }

        self.background.validate()?;

        Ok(())
    }

    fn project_path() -> PathBuf {
        PathBuf::from("reelsmith.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            script: ScriptConfig::default(),
            output: default_output(),
            video: VideoConfig::default(),
            tts: TtsConfig::default(),
            captions: CaptionConfig::default(),
            branding: BrandingConfig::default(),
            background: BackgroundConfig::default(),
            font_path: None,
            work_dir: None,
            cache_dir: None,
            cache_max_mb: None,
            cache_max_entries: None,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            duration_seconds: None,
            tail_seconds: default_tail_seconds(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            preset: default_preset(),
            crf: default_crf(),
            min_output_bytes: default_min_output_bytes(),
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            language: default_language(),
            tld: default_tld(),
            slow: false,
            timeout_seconds: default_timeout_seconds(),
            elevenlabs: ElevenLabsConfig::default(),
            piper: PiperConfig::default(),
        }
    }
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            voice_id: None,
            model_id: default_elevenlabs_model(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
        }
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            mode: CaptionMode::default(),
            words_per_caption: default_words_per_caption(),
            font_size: default_caption_font_size(),
            color: Color::white(),
            stroke_color: None,
            stroke_width: default_stroke_width(),
            max_width: default_max_width(),
            line_spacing: default_line_spacing(),
            vertical_anchor: default_vertical_anchor(),
            uppercase: false,
            words_per_second: default_words_per_second(),
        }
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            text: None,
            font_size: default_branding_font_size(),
            color: Color::white(),
            bottom_margin: default_bottom_margin(),
        }
    }
}

fn default_backend() -> Option<String> {
    Some(crate::tts::DEFAULT_BACKEND.to_string())
}

fn default_output() -> PathBuf {
    PathBuf::from("short.mp4")
}

fn default_width() -> u32 {
    1080
}

fn default_height() -> u32 {
    1920
}

fn default_fps() -> u32 {
    30
}

fn default_tail_seconds() -> f64 {
    0.75
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_crf() -> u8 {
    23
}

fn default_min_output_bytes() -> u64 {
    50 * 1024
}

fn default_language() -> String {
    "en".to_string()
}

fn default_tld() -> String {
    "com".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_elevenlabs_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_stability() -> f32 {
    0.5
}

fn default_similarity_boost() -> f32 {
    0.75
}

fn default_words_per_caption() -> usize {
    3
}

fn default_caption_font_size() -> f32 {
    60.0
}

fn default_stroke_width() -> u32 {
    3
}

fn default_max_width() -> u32 {
    900
}

fn default_line_spacing() -> f32 {
    1.25
}

fn default_vertical_anchor() -> f32 {
    0.5
}

fn default_words_per_second() -> f64 {
    2.6
}

fn default_branding_font_size() -> f32 {
    35.0
}

fn default_bottom_margin() -> u32 {
    120
}
