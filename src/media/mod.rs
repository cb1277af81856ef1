// Media processing
//
// - Commands: ffmpeg argument builder
// - Processor: extraction and availability checks on top of the builder

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Extract a mono PCM WAV track from a video
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()>;

    /// Check if media processor is available
    async fn check_availability(&self) -> Result<()>;

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
