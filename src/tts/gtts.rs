use crate::audio::AudioFormat;
use crate::config::TtsConfig;
use crate::tts::provider::TtsBackend;
use anyhow::{bail, Context};
use regex::Regex;
use reqwest::header::{REFERER, USER_AGENT};
use std::sync::OnceLock;

/// The endpoint rejects requests longer than this many characters.
pub const MAX_CHUNK_CHARS: usize = 100;

const AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                     Chrome/120.0 Safari/537.36";

/// Google Translate's public speech endpoint. Returns MP3; chunks concatenate
/// into one playable stream.
pub struct GoogleTranslateBackend;

impl GoogleTranslateBackend {
    pub fn new() -> Self {
        Self
    }

    fn endpoint(tld: &str) -> String {
        format!("https://translate.google.{tld}/translate_tts")
    }
}

impl Default for GoogleTranslateBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TtsBackend for GoogleTranslateBackend {
    fn name(&self) -> &str {
        "gtts"
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    fn synthesize(&self, text: &str, config: &TtsConfig) -> anyhow::Result<Vec<u8>> {
        let chunks = split_chunks(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            bail!("nothing to synthesize");
        }

        let client = super::http_client(config.timeout_seconds)?;
        let url = Self::endpoint(&config.tld);
        let speed = if config.slow { "0.24" } else { "1" };
        let total = chunks.len().to_string();

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            tracing::debug!(idx, total = chunks.len(), chars = chunk.chars().count(), "gtts chunk");
            let idx_str = idx.to_string();
            let len_str = chunk.chars().count().to_string();
            let bytes = client
                .get(&url)
                .header(USER_AGENT, AGENT)
                .header(REFERER, format!("https://translate.google.{}/", config.tld))
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", config.language.as_str()),
                    ("ttsspeed", speed),
                    ("total", total.as_str()),
                    ("idx", idx_str.as_str()),
                    ("textlen", len_str.as_str()),
                    ("q", chunk.as_str()),
                ])
                .send()
                .with_context(|| format!("request speech chunk {}/{}", idx + 1, chunks.len()))?
                .error_for_status()
                .with_context(|| format!("speech chunk {}/{} rejected", idx + 1, chunks.len()))?
                .bytes()
                .context("read speech chunk body")?;

            if bytes.is_empty() {
                bail!("empty audio for speech chunk {}/{}", idx + 1, chunks.len());
            }
            audio.extend_from_slice(&bytes);
        }

        Ok(audio)
    }

    fn available(&self, _config: &TtsConfig) -> bool {
        true
    }
}

fn clause_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s).+?(?:[.!?;:,]+(?:\s+|$)|$)").expect("static clause regex")
    })
}

/// Splits `text` into pieces of at most `max_chars` characters, preferring
/// sentence and clause boundaries, then word boundaries. Punctuation only
/// ends a clause when whitespace or the end of the text follows it, so
/// `3.5` and `1,000` stay intact.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    for clause in clause_regex().find_iter(text) {
        let clause = clause.as_str().trim();
        if clause.is_empty() {
            continue;
        }
        if clause.chars().count() <= max_chars {
            pieces.push(clause.to_string());
        } else {
            pieces.extend(split_words(clause, max_chars));
        }
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        if current.is_empty() {
            current = piece;
        } else if current.chars().count() + 1 + piece.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(&piece);
        } else {
            chunks.push(std::mem::take(&mut current));
            current = piece;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_words(clause: &str, max_chars: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for word in clause.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            out.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            out.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = split_chunks("That is why routines reduce stress so fast.", 100);
        assert_eq!(chunks, vec!["That is why routines reduce stress so fast."]);
    }

    #[test]
    fn chunks_respect_limit_and_keep_every_word() {
        let text = "Psychology says your brain avoids uncertainty because it feels unsafe. \
                    That is why routines reduce stress so fast. When your brain knows what \
                    comes next, it conserves energy.";
        let chunks = split_chunks(text, 40);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 40));
        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.split_whitespace()).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn numbers_are_not_split_at_separators() {
        let text = "It costs 3.5 dollars, or 1,000 cents.";
        assert_eq!(split_chunks(text, 100), vec![text]);

        let chunks = split_chunks(text, 22);
        assert_eq!(chunks, vec!["It costs 3.5 dollars,", "or 1,000 cents."]);
    }

    #[test]
    fn overlong_word_is_hard_split() {
        let chunks = split_chunks("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }
}
