use crate::error::PipelineError;
use ab_glyph::FontVec;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// Bold sans faces that ship with common desktops and container images.
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/noto/NotoSans-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

pub fn resolve_font_path(explicit: Option<&Path>) -> Result<PathBuf, PipelineError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(PipelineError::FontNotFound {
            tried: path.display().to_string(),
        });
    }

    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
        .ok_or_else(|| PipelineError::FontNotFound {
            tried: SYSTEM_FONT_CANDIDATES.join(", "),
        })
}

pub fn load_font(explicit: Option<&Path>) -> anyhow::Result<FontVec> {
    let path = resolve_font_path(explicit)?;
    tracing::debug!(path = %path.display(), "loading font");
    let bytes = fs::read(&path).with_context(|| format!("read font {}", path.display()))?;
    FontVec::try_from_vec(bytes).with_context(|| format!("parse font {}", path.display()))
}
