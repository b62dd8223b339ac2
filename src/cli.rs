use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::captions::CaptionMode;

#[derive(Parser, Debug)]
#[command(name = "reelsmith", version, about = "Turn a short script into a captioned vertical video")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, value_name = "PATH", help = "Config file to use")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Render(RenderArgs),
    Speak(SpeakArgs),
    Captions(CaptionsArgs),
    Overlay(OverlayArgs),
    Backends(BackendsArgs),
    Doctor(DoctorArgs),
    Config(ConfigArgs),
}

#[derive(Args, Debug, Default)]
pub struct ScriptArgs {
    #[arg(long, help = "Script text to speak")]
    pub script: Option<String>,

    #[arg(long, value_name = "PATH", conflicts_with = "script", help = "Read the script from a file")]
    pub script_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub script: ScriptArgs,

    #[arg(short, long, value_name = "PATH", help = "Output video path")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Override TTS backend")]
    pub backend: Option<String>,

    #[arg(long, help = "Voice id (elevenlabs)")]
    pub voice: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "Fixed clip length")]
    pub duration: Option<f64>,

    #[arg(long, value_enum, help = "Caption grouping")]
    pub captions: Option<CaptionMode>,

    #[arg(long, help = "Write an SRT sidecar next to the video")]
    pub srt: bool,

    #[arg(long, help = "Write a JSON manifest next to the video")]
    pub manifest: bool,

    #[arg(long, help = "Keep intermediate files")]
    pub keep_work: bool,

    #[arg(long, help = "Print the render report as JSON")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SpeakArgs {
    #[command(flatten)]
    pub script: ScriptArgs,

    #[arg(long, help = "TTS backend")]
    pub backend: Option<String>,

    #[arg(long, help = "Voice id (elevenlabs)")]
    pub voice: Option<String>,

    #[arg(short, long, value_name = "PATH", help = "Save audio to file")]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CaptionFormat {
    #[default]
    Srt,
    Json,
}

#[derive(Args, Debug)]
pub struct CaptionsArgs {
    #[command(flatten)]
    pub script: ScriptArgs,

    #[arg(long, value_name = "SECONDS", help = "Speech length; estimated from word count when omitted")]
    pub speech_seconds: Option<f64>,

    #[arg(long, value_enum, help = "Caption grouping")]
    pub mode: Option<CaptionMode>,

    #[arg(long, help = "Words per caption for phrase mode")]
    pub words: Option<usize>,

    #[arg(long, value_enum, default_value_t = CaptionFormat::Srt, help = "Output format")]
    pub format: CaptionFormat,
}

#[derive(Args, Debug)]
pub struct OverlayArgs {
    #[arg(long, help = "Caption text to draw (branding only when omitted)")]
    pub text: Option<String>,

    #[arg(long, help = "Branding text override")]
    pub branding: Option<String>,

    #[arg(short, long, value_name = "PATH", help = "PNG to write")]
    pub output: PathBuf,

    #[arg(long, help = "Paint the configured procedural background underneath")]
    pub with_background: bool,
}

#[derive(Args, Debug)]
pub struct BackendsArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[arg(long, help = "Show current config as JSON")]
    pub show: bool,

    #[arg(long, help = "Create default config file")]
    pub init: bool,

    #[arg(long, help = "Validate configuration")]
    pub validate: bool,
}
