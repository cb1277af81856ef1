use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{info, debug};

use crate::config::DiarizerConfig;
use crate::error::{Result, DiasubError};
use crate::segment::DiarizationTurn;
use super::{Diarizer, rttm};

/// Runs an external diarization program (for example a pyannote wrapper)
/// that writes its speaker turns as RTTM
pub struct CommandDiarizer {
    config: DiarizerConfig,
    hf_token: String,
}

impl CommandDiarizer {
    pub fn new(config: DiarizerConfig, hf_token: String) -> Self {
        Self { config, hf_token }
    }

    fn expand_args(&self, audio_path: &Path, output_path: &Path) -> Vec<String> {
        let audio = audio_path.to_string_lossy();
        let output = output_path.to_string_lossy();
        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{audio}", &audio)
                    .replace("{output}", &output)
                    .replace("{model}", &self.config.model)
            })
            .collect()
    }

    fn build_command(&self, audio_path: &Path, output_path: &Path) -> Command {
        let mut cmd = Command::new(&self.config.binary_path);
        cmd.args(self.expand_args(audio_path, output_path))
            .env("HF_TOKEN", &self.hf_token);
        cmd
    }
}

#[async_trait]
impl Diarizer for CommandDiarizer {
    async fn diarize(&self, audio_path: &Path) -> Result<Vec<DiarizationTurn>> {
        if !audio_path.exists() {
            return Err(DiasubError::FileNotFound(audio_path.display().to_string()));
        }

        info!("Running diarization model '{}' on {}", self.config.model, audio_path.display());

        let temp_dir = tempfile::tempdir()
            .map_err(|e| DiasubError::Diarizer(format!("Failed to create temp directory: {}", e)))?;
        let rttm_path = temp_dir.path().join("turns.rttm");

        let mut command = self.build_command(audio_path, &rttm_path);
        debug!("Executing diarization command: {:?}", command.as_std().get_args().collect::<Vec<_>>());

        let output = command
            .output()
            .await
            .map_err(|e| DiasubError::Diarizer(format!(
                "Failed to execute {}: {}",
                self.config.binary_path, e
            )))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DiasubError::Diarizer(format!("Diarization failed: {}", stderr.trim())));
        }

        let content = tokio::fs::read_to_string(&rttm_path)
            .await
            .map_err(|e| DiasubError::Diarizer(format!("Failed to read RTTM output: {}", e)))?;

        let turns = rttm::parse_rttm(&content)?;
        info!("Diarization produced {} speaker turns", turns.len());
        Ok(turns)
    }

    fn name(&self) -> &'static str {
        "diarization command"
    }
}
