//! Diasub - speaker-labeled subtitles
//!
//! Extracts audio from video with ffmpeg, transcribes it with whisper,
//! attributes each transcript segment to a speaker from a diarization pass,
//! and renders the result as SRT or color-coded ASS subtitles.

pub mod align;
pub mod cli;
pub mod config;
pub mod diarize;
pub mod error;
pub mod events;
pub mod media;
pub mod palette;
pub mod segment;
pub mod subtitle;
pub mod transcribe;
pub mod transcript;
pub mod workflow;
