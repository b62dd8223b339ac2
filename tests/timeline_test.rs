use reelsmith::captions::CaptionMode;
use reelsmith::compose::timeline;
use reelsmith::config::{CaptionConfig, VideoConfig};
use reelsmith::script::Script;

#[test]
fn measured_speech_drives_clip_length() {
    let script = Script::from_text("one two three four").unwrap();
    let video = VideoConfig {
        tail_seconds: 1.0,
        ..VideoConfig::default()
    };
    let captions = CaptionConfig {
        mode: CaptionMode::Words,
        ..CaptionConfig::default()
    };
    let plan = timeline::plan(&script, Some(4.0), &video, &captions);
    assert!(plan.speech_measured);
    assert_eq!(plan.speech_seconds, 4.0);
    assert_eq!(plan.video_seconds, 5.0);
    assert_eq!(plan.frames, 150);
    assert_eq!(plan.cues.len(), 4);
    assert_eq!(plan.cues[3].end, 4.0);
}

#[test]
fn unmeasured_speech_is_estimated_from_words() {
    let script = Script::from_text("a b c d e f g h i j").unwrap();
    let video = VideoConfig {
        tail_seconds: 0.0,
        ..VideoConfig::default()
    };
    let captions = CaptionConfig {
        words_per_second: 2.0,
        ..CaptionConfig::default()
    };
    let plan = timeline::plan(&script, None, &video, &captions);
    assert!(!plan.speech_measured);
    assert_eq!(plan.speech_seconds, 5.0);
    assert_eq!(plan.video_seconds, 5.0);
}

#[test]
fn fixed_duration_overrides_speech() {
    let script = Script::from_text("short script").unwrap();
    let video = VideoConfig {
        duration_seconds: Some(55.0),
        ..VideoConfig::default()
    };
    let plan = timeline::plan(&script, Some(2.0), &video, &CaptionConfig::default());
    assert_eq!(plan.video_seconds, 55.0);
    assert_eq!(plan.frames, 1650);
    assert_eq!(plan.cues.len(), 1);
    assert_eq!(plan.cues[0].end, 55.0);
}
