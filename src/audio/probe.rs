use super::AudioFormat;
use std::path::Path;
use std::process::{Command, Stdio};

/// Length of a speech file in seconds, if it can be read.
pub fn speech_duration(path: &Path, format: AudioFormat) -> Option<f64> {
    let measured = match format {
        AudioFormat::Wav => wav_duration(path).or_else(|| ffprobe_duration(path)),
        AudioFormat::Mp3 => ffprobe_duration(path),
    };
    measured.filter(|seconds| seconds.is_finite() && *seconds > 0.0)
}

pub fn estimate_from_words(words: usize, words_per_second: f64) -> f64 {
    if words == 0 || words_per_second <= 0.0 {
        return 0.0;
    }
    words as f64 / words_per_second
}

pub fn wav_duration(path: &Path) -> Option<f64> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}

pub fn ffprobe_duration(path: &Path) -> Option<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(output) if output.status.success() => {
            parse_seconds(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(output) => {
            tracing::debug!(status = %output.status, "ffprobe could not read duration");
            None
        }
        Err(err) => {
            tracing::debug!(error = %err, "ffprobe unavailable");
            None
        }
    }
}

pub fn is_ffprobe_on_path() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn parse_seconds(raw: &str) -> Option<f64> {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())?
        .parse::<f64>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seconds_reads_first_value() {
        assert_eq!(parse_seconds("12.480000\n"), Some(12.48));
        assert_eq!(parse_seconds("\n  3.5 \n"), Some(3.5));
        assert_eq!(parse_seconds("N/A"), None);
        assert_eq!(parse_seconds(""), None);
    }
}
