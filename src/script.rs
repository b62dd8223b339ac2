use crate::config::ScriptConfig;
use anyhow::{bail, Context};
use std::fs;

/// The text that gets spoken, plus the literal caption lines it came from
/// when the script was configured line by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    text: String,
    lines: Option<Vec<String>>,
}

impl Script {
    pub fn from_config(config: &ScriptConfig) -> anyhow::Result<Self> {
        if let Some(text) = &config.text {
            return Self::from_text(text);
        }

        if let Some(path) = &config.file {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read script file {}", path.display()))?;
            return Self::from_text(&raw);
        }

        if !config.lines.is_empty() {
            return Self::from_lines(&config.lines);
        }

        bail!("no script configured; set script.text, script.file or script.lines");
    }

    pub fn from_text(raw: &str) -> anyhow::Result<Self> {
        let text = normalize(raw);
        if text.is_empty() {
            bail!("script is empty");
        }
        Ok(Self { text, lines: None })
    }

    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> anyhow::Result<Self> {
        let lines: Vec<String> = lines
            .iter()
            .map(|line| normalize(line.as_ref()))
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            bail!("script is empty");
        }
        Ok(Self {
            text: lines.join(" "),
            lines: Some(lines),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn lines(&self) -> Option<&[String]> {
        self.lines.as_deref()
    }
}

fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
