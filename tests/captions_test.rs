use reelsmith::captions::{self, srt, CaptionMode, Cue};
use reelsmith::script::Script;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn word_timings_divide_duration_evenly() {
    let timings = captions::word_timings(&["when", "your", "brain", "knows"], 2.0);
    assert_eq!(timings.len(), 4);
    for (i, timing) in timings.iter().enumerate() {
        assert!(close(timing.start, i as f64 * 0.5));
        assert!(close(timing.end, (i + 1) as f64 * 0.5));
    }
    assert_eq!(timings[2].word, "brain");
}

#[test]
fn word_timings_last_word_ends_exactly_at_speech_end() {
    let timings = captions::word_timings(&["a", "b", "c"], 1.0);
    assert_eq!(timings.last().unwrap().end, 1.0);
}

#[test]
fn word_timings_empty_inputs() {
    assert!(captions::word_timings(&[], 3.0).is_empty());
    assert!(captions::word_timings(&["hi"], 0.0).is_empty());
    assert!(captions::word_timings(&["hi"], f64::NAN).is_empty());
}

#[test]
fn full_mode_shows_whole_script_for_whole_clip() {
    let script = Script::from_text("That is why structure improves focus.").unwrap();
    let timings = captions::word_timings(&script.words(), 3.0);
    let cues = captions::build_cues(&script, &timings, CaptionMode::Full, 3, 55.0);
    assert_eq!(
        cues,
        vec![Cue {
            start: 0.0,
            end: 55.0,
            text: "That is why structure improves focus.".to_string(),
        }]
    );
}

#[test]
fn phrase_mode_groups_words() {
    let script = Script::from_text("one two three four five").unwrap();
    let timings = captions::word_timings(&script.words(), 5.0);
    let cues = captions::build_cues(&script, &timings, CaptionMode::Phrases, 2, 6.0);
    let texts: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["one two", "three four", "five"]);
    assert!(close(cues[1].start, 2.0));
    assert!(close(cues[1].end, 4.0));
    assert!(close(cues[2].end, 5.0));
}

#[test]
fn word_mode_is_one_cue_per_word() {
    let script = Script::from_text("routines reduce stress").unwrap();
    let timings = captions::word_timings(&script.words(), 3.0);
    let cues = captions::build_cues(&script, &timings, CaptionMode::Words, 4, 3.0);
    assert_eq!(cues.len(), 3);
    assert_eq!(cues[0].text, "routines");
}

#[test]
fn line_mode_keeps_literal_lines() {
    let script = Script::from_lines(&["Your brain hates uncertainty.", "Routines help."]).unwrap();
    let timings = captions::word_timings(&script.words(), 6.0);
    let cues = captions::build_cues(&script, &timings, CaptionMode::Lines, 3, 7.0);
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "Your brain hates uncertainty.");
    assert!(close(cues[0].end, 4.0));
    assert!(close(cues[1].start, 4.0));
    assert!(close(cues[1].end, 6.0));
}

#[test]
fn line_mode_without_lines_falls_back_to_phrases() {
    let script = Script::from_text("a b c d").unwrap();
    let timings = captions::word_timings(&script.words(), 4.0);
    let cues = captions::build_cues(&script, &timings, CaptionMode::Lines, 2, 4.0);
    assert_eq!(cues.len(), 2);
}

#[test]
fn cue_lookup_is_half_open() {
    let cues = vec![
        Cue { start: 0.0, end: 1.0, text: "a".into() },
        Cue { start: 1.0, end: 2.0, text: "b".into() },
    ];
    assert_eq!(captions::cue_at(&cues, 0.0), Some(0));
    assert_eq!(captions::cue_at(&cues, 0.999), Some(0));
    assert_eq!(captions::cue_at(&cues, 1.0), Some(1));
    assert_eq!(captions::cue_at(&cues, 2.0), None);
    assert_eq!(captions::cue_at(&cues, -0.1), None);
}

#[test]
fn srt_export_formats_timestamps() {
    let cues = vec![
        Cue { start: 0.0, end: 1.5, text: "Psychology says".into() },
        Cue { start: 3661.25, end: 3662.0, text: "done".into() },
    ];
    let out = srt::to_srt(&cues);
    assert_eq!(
        out,
        "1\n00:00:00,000 --> 00:00:01,500\nPsychology says\n\n\
         2\n01:01:01,250 --> 01:01:02,000\ndone\n\n"
    );
}

#[test]
fn srt_timestamp_rounds_to_millis() {
    assert_eq!(srt::timestamp(0.0004), "00:00:00,000");
    assert_eq!(srt::timestamp(59.9996), "00:01:00,000");
    assert_eq!(srt::timestamp(-2.0), "00:00:00,000");
}
