use anyhow::{bail, Context};
use reqwest::header::CONTENT_TYPE;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "mkv", "m4v", "avi"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Downloads `url` into `dir`, naming the file after the media kind.
pub fn download(url: &str, dir: &Path, timeout_seconds: u64) -> anyhow::Result<(PathBuf, MediaKind)> {
    let mut builder = reqwest::blocking::Client::builder();
    if timeout_seconds > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_seconds));
    }
    let client = builder.build().context("build http client")?;

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("request background {url}"))?
        .error_for_status()
        .with_context(|| format!("background {url} rejected"))?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().context("read background body")?;
    if bytes.is_empty() {
        bail!("background {url} was empty");
    }

    let from_header = content_type.as_deref().and_then(extension_for_content_type);
    if let Some(ct) = content_type.as_deref() {
        if from_header.is_none() && !ct.starts_with("application/octet-stream") {
            bail!("background {url} is {ct}, not an image or video");
        }
    }
    let Some(ext) = extension_of(url).or(from_header) else {
        bail!("cannot tell whether background {url} is an image or a video");
    };
    let Some(kind) = kind_for_extension(&ext) else {
        bail!("unsupported background type .{ext}");
    };

    fs::create_dir_all(dir).context("create work dir")?;
    let path = dir.join(format!("background.{ext}"));
    fs::write(&path, &bytes).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "downloaded background");
    Ok((path, kind))
}

pub fn kind_for_extension(ext: &str) -> Option<MediaKind> {
    let ext = ext.to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// File extension for an `image/*` or `video/*` content type.
fn extension_for_content_type(content_type: &str) -> Option<String> {
    let mime = content_type.split(';').next()?.trim().to_ascii_lowercase();
    let (top, sub) = mime.split_once('/')?;
    let ext = match (top, sub) {
        ("image", "jpeg" | "jpg" | "pjpeg") => "jpg",
        ("image", "png") => "png",
        ("image", "webp") => "webp",
        ("image", "bmp") => "bmp",
        ("image", _) => "jpg",
        ("video", "webm") => "webm",
        ("video", "quicktime") => "mov",
        ("video", "x-matroska") => "mkv",
        ("video", _) => "mp4",
        _ => return None,
    };
    Some(ext.to_string())
}

fn extension_of(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let name = path.rsplit('/').next()?;
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    kind_for_extension(&ext).map(|_| ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_ignores_query_and_unknown_suffixes() {
        assert_eq!(
            extension_of("https://cdn.example.com/a/loop.MP4?sig=1"),
            Some("mp4".to_string())
        );
        assert_eq!(extension_of("https://example.com/img.jpeg#x"), Some("jpeg".to_string()));
        assert_eq!(extension_of("https://example.com/video"), None);
        assert_eq!(extension_of("https://example.com/page.html"), None);
    }

    #[test]
    fn content_types_map_to_media_extensions() {
        assert_eq!(extension_for_content_type("image/png"), Some("png".to_string()));
        assert_eq!(extension_for_content_type("Image/JPEG; q=1"), Some("jpg".to_string()));
        assert_eq!(extension_for_content_type("video/webm"), Some("webm".to_string()));
        assert_eq!(extension_for_content_type("video/mp4"), Some("mp4".to_string()));
        assert_eq!(extension_for_content_type("text/html; charset=utf-8"), None);
        assert_eq!(extension_for_content_type("application/json"), None);
    }

    #[test]
    fn kinds_by_extension() {
        assert_eq!(kind_for_extension("PNG"), Some(MediaKind::Image));
        assert_eq!(kind_for_extension("webm"), Some(MediaKind::Video));
        assert_eq!(kind_for_extension("txt"), None);
    }
}
