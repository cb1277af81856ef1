use async_trait::async_trait;
use std::path::Path;
use tracing::{info, debug};

use crate::config::MediaConfig;
use crate::error::{Result, DiasubError};
use super::{MediaProcessorTrait, MediaCommandBuilder};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    /// Extract audio from video
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        if !video_path.exists() {
            return Err(DiasubError::FileNotFound(video_path.display().to_string()));
        }

        info!("Extracting audio from {} to {}", video_path.display(), audio_path.display());

        let command = self.command_builder.extract_audio(
            video_path,
            audio_path,
            self.config.sample_rate,
            self.config.channels,
        );
        command.execute().await?;

        info!("Audio extraction completed");
        Ok(())
    }

    /// Check if media processor is available
    async fn check_availability(&self) -> Result<()> {
        self.command_builder
            .version_check()
            .execute()
            .await
            .map_err(|e| DiasubError::Media(format!("Media processor not found: {}", e)))?;

        info!("Media processor is available");
        Ok(())
    }

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let output = self.command_builder.version_check().run().await?;
        let version_info = String::from_utf8_lossy(&output.stdout);
        // Extract the first line which typically contains the version
        let first_line = version_info.lines().next().unwrap_or("Unknown version");
        Ok(first_line.to_string())
    }
}
