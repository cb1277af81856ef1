//! Diasub - speaker-labeled subtitles for video files
//!
//! Entry point for the `diasub` binary: extracts audio with ffmpeg,
//! transcribes it with whisper, optionally labels speakers with a
//! diarization model, and writes SRT or ASS subtitles.

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use diasub::cli::{resolve_format, resolve_language, Args, Commands};
use diasub::config::Config;
use diasub::diarize::{Diarizer, DiarizerFactory};
use diasub::events::{EventSink, ProgressSink, TracingSink};
use diasub::subtitle::SubtitleFormat;
use diasub::workflow::{render_file, ProcessOptions, Workflow};

const DEFAULT_CONFIG_FILE: &str = "diasub.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    let events = event_sink(args.verbose);

    match args.command {
        Commands::Process {
            input,
            output,
            format,
            model,
            language,
            diarize,
            hf_token,
            turns,
            transcript_out,
        } => {
            apply_transcriber_overrides(&mut config, model, language);
            let format = resolve_format(format.as_deref(), &output, &config.subtitle.format)?;
            let diarizer = build_diarizer(
                &mut config,
                diarize || turns.is_some(),
                hf_token,
                turns,
            )?;

            let workflow = Workflow::new(&config, diarizer, events);
            workflow.check_dependencies().await?;

            let options = ProcessOptions {
                format,
                transcript_out,
            };
            let written = workflow.process_video(&input, &output, &options).await?;
            println!("Wrote {} subtitle entries to {}", written, output.display());
        }
        Commands::Batch {
            input_dir,
            output_dir,
            format,
            diarize,
            hf_token,
        } => {
            let format = match format {
                Some(name) => name.parse::<SubtitleFormat>()?,
                None => config.subtitle.format.parse::<SubtitleFormat>()?,
            };
            let diarizer = build_diarizer(&mut config, diarize, hf_token, None)?;

            let workflow = Workflow::new(&config, diarizer, events);
            workflow.check_dependencies().await?;

            let report = workflow
                .process_directory(&input_dir, output_dir.as_deref(), format)
                .await?;
            println!(
                "Processed {} videos, {} failed",
                report.processed.len(),
                report.failed.len()
            );
            for (path, reason) in &report.failed {
                println!("  {}: {}", path.display(), reason);
            }
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from: {}", input.display());
            let workflow = Workflow::new(&config, None, events);
            workflow.check_dependencies().await?;
            workflow.extract_audio(&input, &output).await?;
        }
        Commands::Transcribe {
            input,
            output,
            model,
            language,
        } => {
            info!("Transcribing audio: {}", input.display());
            apply_transcriber_overrides(&mut config, model, language);
            let workflow = Workflow::new(&config, None, events);
            let written = workflow.transcribe_audio(&input, &output).await?;
            println!("Wrote {} segments to {}", written, output.display());
        }
        Commands::Diarize {
            input,
            transcript,
            output,
            hf_token,
            turns,
        } => {
            info!("Labeling speakers in: {}", transcript.display());
            let diarizer = build_diarizer(&mut config, true, hf_token, turns)?;
            let workflow = Workflow::new(&config, diarizer, events);
            let written = workflow.label_speakers(&input, &transcript, &output).await?;
            println!("Wrote {} labeled segments to {}", written, output.display());
        }
        Commands::Render {
            input,
            output,
            format,
        } => {
            let format = resolve_format(format.as_deref(), &output, &config.subtitle.format)?;
            let written = render_file(&input, &output, format).await?;
            println!("Wrote {} subtitle entries to {}", written, output.display());
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Default configuration written to {}", output.display());
        }
    }

    info!("Diasub completed successfully");
    Ok(())
}

fn apply_transcriber_overrides(config: &mut Config, model: Option<String>, language: Option<String>) {
    if let Some(model) = model {
        config.transcriber.model = model;
    }
    if let Some(language) = language {
        config.transcriber.language = resolve_language(language);
    }
}

/// Diarization runs when requested on the command line or enabled in config
fn build_diarizer(
    config: &mut Config,
    requested: bool,
    hf_token: Option<String>,
    turns: Option<PathBuf>,
) -> Result<Option<Box<dyn Diarizer>>> {
    if let Some(token) = hf_token {
        config.diarizer.hf_token = Some(token);
    }
    if !(requested || config.diarizer.enabled) {
        return Ok(None);
    }
    Ok(Some(DiarizerFactory::create_diarizer(&config.diarizer, turns)?))
}

/// Spinner on an interactive terminal, plain log lines otherwise
fn event_sink(verbose: bool) -> Arc<dyn EventSink> {
    let tracing_sink: Arc<dyn EventSink> = Arc::new(TracingSink);
    if !verbose && std::io::stderr().is_terminal() {
        Arc::new(ProgressSink::new(tracing_sink))
    } else {
        tracing_sink
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".diasub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "diasub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("diasub.log").display()
    );

    Ok(())
}
