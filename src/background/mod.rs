pub mod fetch;
pub mod procedural;

use crate::config::Color;
use anyhow::{bail, Context};
use fetch::MediaKind;
use procedural::{BackgroundPainter, Gradient, Orbs, Solid};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const FALLBACK_COLOR: Color = Color::rgb(15, 15, 15);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackgroundConfig {
    Solid {
        #[serde(default = "fallback_color")]
        color: Color,
    },
    Gradient {
        top: Color,
        bottom: Color,
        #[serde(default = "default_speed")]
        speed: f64,
    },
    Orbs {
        #[serde(default = "fallback_color")]
        base: Color,
        #[serde(default = "Color::white")]
        color: Color,
        #[serde(default = "default_orb_count")]
        count: usize,
        #[serde(default)]
        seed: Option<u64>,
    },
    Image {
        path: PathBuf,
    },
    Clip {
        path: PathBuf,
    },
    RandomClip {
        dir: PathBuf,
    },
    Remote {
        url: String,
        #[serde(default = "default_remote_timeout")]
        timeout_seconds: u64,
    },
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self::Solid {
            color: FALLBACK_COLOR,
        }
    }
}

impl BackgroundConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        match self {
            Self::Gradient { speed, .. } if !(speed.is_finite() && *speed >= 0.0) => {
                bail!("background.speed must not be negative")
            }
            Self::Orbs { count, .. } if *count > 500 => {
                bail!("background.count must be at most 500")
            }
            Self::Remote { url, .. } if !(url.starts_with("http://") || url.starts_with("https://")) => {
                bail!("background.url must be an http(s) URL")
            }
            _ => Ok(()),
        }
    }
}

/// What sits underneath the overlays.
pub enum Backdrop {
    /// Drawn by us, frame by frame.
    Painted(Box<dyn BackgroundPainter>),
    /// A still image handed to the encoder and looped.
    Still(PathBuf),
    /// A video file handed to the encoder and looped.
    Footage(PathBuf),
}

impl Backdrop {
    pub fn describe(&self) -> String {
        match self {
            Backdrop::Painted(painter) => painter.name().to_string(),
            Backdrop::Still(path) => format!("image {}", path.display()),
            Backdrop::Footage(path) => format!("clip {}", path.display()),
        }
    }
}

pub fn resolve(
    config: &BackgroundConfig,
    width: u32,
    height: u32,
    work_dir: &Path,
) -> anyhow::Result<Backdrop> {
    let backdrop = match config {
        BackgroundConfig::Solid { color } => Backdrop::Painted(Box::new(Solid { color: *color })),
        BackgroundConfig::Gradient { top, bottom, speed } => Backdrop::Painted(Box::new(Gradient {
            top: *top,
            bottom: *bottom,
            speed: *speed,
        })),
        BackgroundConfig::Orbs {
            base,
            color,
            count,
            seed,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            tracing::debug!(seed, "orbs background seed");
            Backdrop::Painted(Box::new(Orbs::new(width, height, *base, *color, *count, seed)))
        }
        BackgroundConfig::Image { path } => Backdrop::Still(existing(path)?),
        BackgroundConfig::Clip { path } => Backdrop::Footage(existing(path)?),
        BackgroundConfig::RandomClip { dir } => Backdrop::Footage(pick_random_clip(dir)?),
        BackgroundConfig::Remote {
            url,
            timeout_seconds,
        } => match fetch::download(url, work_dir, *timeout_seconds) {
            Ok((path, MediaKind::Image)) => Backdrop::Still(path),
            Ok((path, MediaKind::Video)) => Backdrop::Footage(path),
            Err(err) => {
                tracing::warn!(error = ?err, url = %url, "background download failed; using solid color");
                Backdrop::Painted(Box::new(Solid {
                    color: FALLBACK_COLOR,
                }))
            }
        },
    };

    tracing::info!(background = %backdrop.describe(), "background ready");
    Ok(backdrop)
}

pub fn pick_random_clip(dir: &Path) -> anyhow::Result<PathBuf> {
    let clips = list_clips(dir)?;
    let mut rng = rand::thread_rng();
    match clips.choose(&mut rng) {
        Some(path) => Ok(path.clone()),
        None => bail!("no video clips found in {}", dir.display()),
    }
}

pub fn list_clips(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut clips = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read clip dir {}", dir.display()))? {
        let path = entry?.path();
        let is_video = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(fetch::kind_for_extension)
            == Some(MediaKind::Video);
        if path.is_file() && is_video {
            clips.push(path);
        }
    }
    clips.sort();
    Ok(clips)
}

fn existing(path: &Path) -> anyhow::Result<PathBuf> {
    if !path.is_file() {
        bail!("background file not found: {}", path.display());
    }
    Ok(path.to_path_buf())
}

fn fallback_color() -> Color {
    FALLBACK_COLOR
}

fn default_speed() -> f64 {
    0.05
}

fn default_orb_count() -> usize {
    24
}

fn default_remote_timeout() -> u64 {
    30
}
