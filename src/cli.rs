use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::subtitle::SubtitleFormat;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate speaker-labeled subtitles for a video file
    Process {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,

        /// Subtitle format (srt or ass); inferred from the output extension if omitted
        #[arg(short, long)]
        format: Option<String>,

        /// Whisper model name
        #[arg(short, long)]
        model: Option<String>,

        /// Spoken language, or "auto" to let whisper detect it
        #[arg(short, long)]
        language: Option<String>,

        /// Label subtitles with speakers
        #[arg(long)]
        diarize: bool,

        /// HuggingFace token for the diarization model
        #[arg(long)]
        hf_token: Option<String>,

        /// Use precomputed speaker turns (RTTM or JSON) instead of running diarization
        #[arg(long)]
        turns: Option<PathBuf>,

        /// Also write the labeled transcript as JSON
        #[arg(long)]
        transcript_out: Option<PathBuf>,
    },

    /// Process all video files in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory for subtitle files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Subtitle format (srt or ass)
        #[arg(short, long)]
        format: Option<String>,

        /// Label subtitles with speakers
        #[arg(long)]
        diarize: bool,

        /// HuggingFace token for the diarization model
        #[arg(long)]
        hf_token: Option<String>,
    },

    /// Extract audio from video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Transcribe audio to a transcript JSON (or subtitles, by extension)
    Transcribe {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output transcript file
        #[arg(short, long)]
        output: PathBuf,

        /// Whisper model name
        #[arg(short, long)]
        model: Option<String>,

        /// Spoken language, or "auto"
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Label an existing transcript with speakers
    Diarize {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Transcript JSON produced by `transcribe`
        #[arg(short, long)]
        transcript: PathBuf,

        /// Output labeled transcript
        #[arg(short, long)]
        output: PathBuf,

        /// HuggingFace token for the diarization model
        #[arg(long)]
        hf_token: Option<String>,

        /// Use precomputed speaker turns (RTTM or JSON)
        #[arg(long)]
        turns: Option<PathBuf>,
    },

    /// Render a transcript JSON or SRT file as subtitles
    Render {
        /// Input transcript (.json) or subtitle (.srt)
        #[arg(short, long)]
        input: PathBuf,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,

        /// Subtitle format (srt or ass)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output configuration file
        #[arg(short, long, default_value = "diasub.toml")]
        output: PathBuf,
    },
}

/// An explicit `--format` wins, then the output extension, then the
/// configured default
pub fn resolve_format(flag: Option<&str>, output: &Path, default: &str) -> Result<SubtitleFormat> {
    match flag {
        Some(name) => name.parse(),
        None => SubtitleFormat::from_path(output).or_else(|_| default.parse()),
    }
}

/// `auto` lets the transcriber detect the language
pub fn resolve_language(flag: String) -> Option<String> {
    if flag.eq_ignore_ascii_case("auto") {
        None
    } else {
        Some(flag)
    }
}
