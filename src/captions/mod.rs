pub mod srt;

use crate::script::Script;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How the spoken words are grouped on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaptionMode {
    /// The whole script, wrapped, for the whole clip.
    #[default]
    Full,
    Words,
    Phrases,
    Lines,
}

/// A word and the slice of the speech it is assumed to occupy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordTiming {
    pub start: f64,
    pub end: f64,
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Cue {
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// Splits `speech_seconds` evenly across `words`. This is an estimate; it is
/// never checked against the audio itself.
pub fn word_timings(words: &[&str], speech_seconds: f64) -> Vec<WordTiming> {
    if words.is_empty() || !(speech_seconds.is_finite() && speech_seconds > 0.0) {
        return Vec::new();
    }

    let step = speech_seconds / words.len() as f64;
    words
        .iter()
        .enumerate()
        .map(|(i, word)| WordTiming {
            start: step * i as f64,
            end: if i + 1 == words.len() {
                speech_seconds
            } else {
                step * (i + 1) as f64
            },
            word: (*word).to_string(),
        })
        .collect()
}

pub fn build_cues(
    script: &Script,
    timings: &[WordTiming],
    mode: CaptionMode,
    words_per_caption: usize,
    video_seconds: f64,
) -> Vec<Cue> {
    match mode {
        CaptionMode::Full => vec![Cue {
            start: 0.0,
            end: video_seconds,
            text: script.text().to_string(),
        }],
        CaptionMode::Words => group_by(timings, 1),
        CaptionMode::Phrases => group_by(timings, words_per_caption),
        CaptionMode::Lines => match script.lines() {
            Some(lines) => group_by_lines(timings, lines),
            None => {
                tracing::debug!("no script lines configured; grouping captions as phrases");
                group_by(timings, words_per_caption)
            }
        },
    }
}

/// Active cue at `t`. Cue intervals are half-open.
pub fn cue_at(cues: &[Cue], t: f64) -> Option<usize> {
    cues.iter().position(|cue| cue.contains(t))
}

fn group_by(timings: &[WordTiming], size: usize) -> Vec<Cue> {
    timings.chunks(size.max(1)).filter_map(merge).collect()
}

fn group_by_lines(timings: &[WordTiming], lines: &[String]) -> Vec<Cue> {
    let mut cues = Vec::with_capacity(lines.len());
    let mut rest = timings;
    for line in lines {
        let count = line.split_whitespace().count().min(rest.len());
        let (head, tail) = rest.split_at(count);
        if let Some(cue) = merge(head) {
            cues.push(Cue {
                text: line.clone(),
                ..cue
            });
        }
        rest = tail;
    }
    cues
}

fn merge(group: &[WordTiming]) -> Option<Cue> {
    let first = group.first()?;
    let last = group.last()?;
    Some(Cue {
        start: first.start,
        end: last.end,
        text: group
            .iter()
            .map(|timing| timing.word.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    })
}
