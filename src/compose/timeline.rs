use crate::audio::probe;
use crate::captions::{self, Cue};
use crate::compose::encoder;
use crate::config::{CaptionConfig, VideoConfig};
use crate::script::Script;
use serde::Serialize;

/// Everything about *when* things happen in the clip.
#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub speech_seconds: f64,
    /// False when the speech length is a words-per-second estimate.
    pub speech_measured: bool,
    pub video_seconds: f64,
    pub frames: u64,
    pub cues: Vec<Cue>,
}

pub fn plan(
    script: &Script,
    measured_speech: Option<f64>,
    video: &VideoConfig,
    captions_cfg: &CaptionConfig,
) -> Timeline {
    let (speech_seconds, speech_measured) = match measured_speech {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => (seconds, true),
        _ => (
            probe::estimate_from_words(script.word_count(), captions_cfg.words_per_second),
            false,
        ),
    };

    let video_seconds = video
        .duration_seconds
        .unwrap_or(speech_seconds + video.tail_seconds)
        .max(1.0 / f64::from(video.fps.max(1)));
    let frames = encoder::frame_count(video_seconds, video.fps);

    let timings = captions::word_timings(&script.words(), speech_seconds);
    let cues = captions::build_cues(
        script,
        &timings,
        captions_cfg.mode,
        captions_cfg.words_per_caption,
        video_seconds,
    );

    Timeline {
        speech_seconds,
        speech_measured,
        video_seconds,
        frames,
        cues,
    }
}
