// Speech-to-text adapters
//
// Each implementation drives an external recognizer, parses its JSON output
// and maps it to plain `Segment`s through a `TranscriptionMapper`:
// - WhisperCpp: whisper.cpp command line (whisper-cli)
// - OpenAI: OpenAI Whisper Python command line (whisper)

pub mod common;
pub mod openai;
pub mod whisper_cpp;

use async_trait::async_trait;
use std::path::Path;

pub use common::*;
use crate::config::{TranscriberConfig, TranscriberImplementation};
use crate::error::Result;
use crate::segment::Segment;

/// Produces time-ordered transcription segments from an audio file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Segment>>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create_transcriber(config: TranscriberConfig) -> Box<dyn Transcriber> {
        match config.implementation {
            TranscriberImplementation::WhisperCpp => {
                Box::new(whisper_cpp::WhisperCppTranscriber::new(config))
            }
            TranscriberImplementation::OpenAI => {
                Box::new(openai::OpenAITranscriber::new(config))
            }
        }
    }
}
