use super::Cue;
use std::fmt::Write;

pub fn to_srt(cues: &[Cue]) -> String {
    let mut out = String::new();
    for (i, cue) in cues.iter().enumerate() {
        let _ = writeln!(out, "{}", i + 1);
        let _ = writeln!(
            out,
            "{} --> {}",
            timestamp(cue.start),
            timestamp(cue.end)
        );
        let _ = writeln!(out, "{}", cue.text);
        out.push('\n');
    }
    out
}

/// `HH:MM:SS,mmm`, rounded to the nearest millisecond.
pub fn timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        total_s / 3600,
        (total_s / 60) % 60,
        total_s % 60,
        ms
    )
}
