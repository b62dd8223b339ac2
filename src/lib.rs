pub mod audio;
pub mod background;
pub mod captions;
pub mod cli;
pub mod compose;
pub mod config;
pub mod error;
pub mod overlay;
pub mod script;
pub mod system;
pub mod tts;

use anyhow::Context;
use background::Backdrop;
use cli::{CaptionFormat, Cli, Commands};
use config::Config;
use script::Script;
use std::path::Path;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    setup_tracing(cli.verbose);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Render(args) => render(args, config_path),
        Commands::Speak(args) => speak(args, config_path),
        Commands::Captions(args) => captions_cmd(args, config_path),
        Commands::Overlay(args) => overlay_cmd(args, config_path),
        Commands::Backends(args) => backends(args, config_path),
        Commands::Doctor(args) => doctor(args, config_path),
        Commands::Config(args) => config_cmd(args, config_path),
    }
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn apply_script_args(config: &mut Config, args: &cli::ScriptArgs) {
    if let Some(text) = &args.script {
        config.script.text = Some(text.clone());
    } else if let Some(path) = &args.script_file {
        config.script.text = None;
        config.script.file = Some(path.clone());
    }
}

fn render(args: cli::RenderArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = Config::load(config_path).context("load config")?;
    apply_script_args(&mut config, &args.script);
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(voice) = args.voice {
        config.tts.elevenlabs.voice_id = Some(voice);
    }
    if let Some(duration) = args.duration {
        config.video.duration_seconds = Some(duration);
    }
    if let Some(mode) = args.captions {
        config.captions.mode = mode;
    }

    let options = compose::RenderOptions {
        backend: args.backend,
        write_srt: args.srt,
        write_manifest: args.manifest,
        keep_work: args.keep_work,
    };
    let report = compose::render(&config, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Video generated: {}", report.output.display());
    println!(
        "Length: {:.2}s ({} frames, {} captions)",
        report.video_seconds, report.frames, report.cues
    );
    if let Some(dir) = &report.work_dir {
        println!("Work dir: {}", dir.display());
    }
    Ok(())
}

fn speak(args: cli::SpeakArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = Config::load(config_path).context("load config")?;
    apply_script_args(&mut config, &args.script);
    if let Some(voice) = args.voice {
        config.tts.elevenlabs.voice_id = Some(voice);
    }

    let script = Script::from_config(&config.script)?;
    let speech = tts::synthesize(script.text(), &config, &args.backend).context("tts synthesis")?;
    std::fs::write(&args.output, &speech.bytes)
        .with_context(|| format!("write {}", args.output.display()))?;

    println!(
        "Saved {} bytes of {} audio to {}",
        speech.bytes.len(),
        speech.format.extension(),
        args.output.display()
    );
    Ok(())
}

fn captions_cmd(args: cli::CaptionsArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = Config::load(config_path).context("load config")?;
    apply_script_args(&mut config, &args.script);
    if let Some(mode) = args.mode {
        config.captions.mode = mode;
    }
    if let Some(words) = args.words {
        if words == 0 {
            anyhow::bail!("--words must be greater than 0");
        }
        config.captions.words_per_caption = words;
    }
    if let Some(seconds) = args.speech_seconds {
        if !(seconds.is_finite() && seconds > 0.0) {
            anyhow::bail!("--speech-seconds must be a positive number");
        }
    }

    let script = Script::from_config(&config.script)?;
    let timeline = compose::plan_captions(&config, &script, args.speech_seconds);

    match args.format {
        CaptionFormat::Srt => print!("{}", captions::srt::to_srt(&timeline.cues)),
        CaptionFormat::Json => println!("{}", serde_json::to_string_pretty(&timeline)?),
    }
    Ok(())
}

fn overlay_cmd(args: cli::OverlayArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = Config::load(config_path).context("load config")?;
    if let Some(branding) = args.branding {
        config.branding.text = Some(branding);
    }

    let video = &config.video;
    let font = overlay::font::load_font(config.font_path.as_deref())?;
    let renderer = overlay::OverlayRenderer::new(
        font,
        video.width,
        video.height,
        &config.captions,
        &config.branding,
    );
    let layer = renderer.compose(args.text.as_deref());

    let image = if args.with_background {
        let scratch = tempfile::tempdir().context("create scratch dir")?;
        match background::resolve(&config.background, video.width, video.height, scratch.path())? {
            Backdrop::Painted(painter) => {
                let mut frame = image::RgbaImage::new(video.width, video.height);
                painter.paint(&mut frame, 0.0);
                image::imageops::overlay(&mut frame, &layer, 0, 0);
                frame
            }
            other => {
                tracing::warn!(background = %other.describe(), "only painted backgrounds can be previewed");
                layer
            }
        }
    } else {
        layer
    };

    compose::encoder::ensure_parent_dir(&args.output)?;
    image
        .save(&args.output)
        .with_context(|| format!("write {}", args.output.display()))?;
    println!("Overlay written: {}", args.output.display());
    Ok(())
}

fn backends(args: cli::BackendsArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("load config")?;
    let info = tts::backends_info(&config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Speech backends:");
    for backend in info.backends {
        let status = if backend.available { "available" } else { "unavailable" };
        println!("- {} ({}, {})", backend.name, backend.format, status);
    }

    if let Some(cache_dir) = info.cache_dir {
        println!("Cache dir: {}", cache_dir.display());
    }

    Ok(())
}

fn doctor(args: cli::DoctorArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("load config")?;
    let info = system::detect(&config);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let yes_no = |v: bool| if v { "yes" } else { "no" };
    println!("OS: {} ({})", info.os, info.arch);
    println!("ffmpeg: {}", yes_no(info.ffmpeg));
    println!("ffprobe: {}", yes_no(info.ffprobe));
    match &info.font {
        Some(path) => println!("Font: {}", path.display()),
        None => println!("Font: not found"),
    }
    println!(
        "ElevenLabs credentials: key={} voice={}",
        yes_no(info.elevenlabs_key),
        yes_no(info.elevenlabs_voice)
    );

    let blockers = info.blockers();
    if !blockers.is_empty() {
        anyhow::bail!("not ready to render: {}", blockers.join("; "));
    }
    Ok(())
}

fn config_cmd(args: cli::ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    if args.init {
        let path = Config::init_default()?;
        println!("Initialized config at {}", path.display());
        return Ok(());
    }

    if args.show {
        let config = Config::load(config_path)?;
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if args.validate {
        let config = Config::load(config_path)?;
        config.validate()?;
        println!("Config OK");
        return Ok(());
    }

    match config_path {
        Some(path) => println!("{}", path.display()),
        None => println!("{}", Config::default_path()?.display()),
    }
    Ok(())
}
