// Speaker diarization adapters
//
// - Command: runs an external diarization program that writes RTTM
// - TurnsFile: replays turns precomputed into an RTTM or JSON file

pub mod command;
pub mod rttm;
pub mod turns_file;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::DiarizerConfig;
use crate::error::{Result, DiasubError};
use crate::segment::DiarizationTurn;

/// Produces time-ordered speaker turns from an audio file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Diarizer: Send + Sync {
    async fn diarize(&self, audio_path: &Path) -> Result<Vec<DiarizationTurn>>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Factory for creating diarizer instances
pub struct DiarizerFactory;

impl DiarizerFactory {
    /// A turns file takes precedence over running the diarization command.
    /// The command needs a HuggingFace token for the pretrained pipeline.
    pub fn create_diarizer(
        config: &DiarizerConfig,
        turns_file: Option<PathBuf>,
    ) -> Result<Box<dyn Diarizer>> {
        if let Some(path) = turns_file {
            return Ok(Box::new(turns_file::TurnsFileDiarizer::new(path)));
        }

        let token = config.resolve_token().ok_or_else(|| {
            DiasubError::Config(
                "HuggingFace token required for diarization. Use --hf-token <token> or set HF_TOKEN"
                    .to_string(),
            )
        })?;

        Ok(Box::new(command::CommandDiarizer::new(config.clone(), token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_file_needs_no_token() {
        let config = DiarizerConfig::default();
        let diarizer =
            DiarizerFactory::create_diarizer(&config, Some(PathBuf::from("turns.rttm"))).unwrap();
        assert_eq!(diarizer.name(), "turns file");
    }

    #[test]
    fn test_command_with_configured_token() {
        let config = DiarizerConfig {
            hf_token: Some("hf_test".to_string()),
            ..DiarizerConfig::default()
        };
        let diarizer = DiarizerFactory::create_diarizer(&config, None).unwrap();
        assert_eq!(diarizer.name(), "diarization command");
    }
}
