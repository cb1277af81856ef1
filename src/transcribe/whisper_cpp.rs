use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{Result, DiasubError};
use crate::segment::Segment;
use super::{Transcriber, TranscriptionMapper, WhisperUtils};

const TOOL: &str = "whisper.cpp";

/// whisper.cpp `-oj` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOutput {
    pub result: Option<WhisperCppResult>,
    pub transcription: Vec<WhisperCppSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppResult {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppSegment {
    pub offsets: WhisperCppOffsets,
    pub text: String,
}

/// Segment bounds in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOffsets {
    pub from: i64,
    pub to: i64,
}

pub struct WhisperCppMapper;

impl TranscriptionMapper<WhisperCppOutput> for WhisperCppMapper {
    fn to_segments(whisper_output: WhisperCppOutput) -> Result<Vec<Segment>> {
        Ok(whisper_output
            .transcription
            .into_iter()
            .map(|seg| {
                Segment::new(
                    seg.offsets.from as f64 / 1000.0,
                    seg.offsets.to as f64 / 1000.0,
                    seg.text.trim(),
                )
            })
            .collect())
    }
}

/// Transcriber backed by the whisper.cpp command line
pub struct WhisperCppTranscriber {
    config: TranscriberConfig,
}

impl WhisperCppTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, audio_path: &Path, output_prefix: &Path) -> Command {
        let model_path = WhisperUtils::resolve_model_path(&self.config.model, &self.config.models_dir);

        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg("-m").arg(model_path)
            .arg("-f").arg(audio_path)
            .arg("-l").arg(self.config.language.as_deref().unwrap_or("auto"))
            .arg("-oj")
            .arg("-of").arg(output_prefix);
        cmd
    }
}

#[async_trait]
impl Transcriber for WhisperCppTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Segment>> {
        info!("Transcribing {} with whisper.cpp model '{}'", audio_path.display(), self.config.model);

        let temp_dir = tempfile::tempdir()
            .map_err(|e| DiasubError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_prefix = temp_dir.path().join("transcript");

        WhisperUtils::run(self.build_command(audio_path, &output_prefix), TOOL).await?;

        let whisper_output: WhisperCppOutput =
            WhisperUtils::read_json(&output_prefix.with_extension("json"), TOOL).await?;
        if let Some(result) = &whisper_output.result {
            info!("whisper.cpp detected language: {}", result.language);
        }

        let segments = WhisperCppMapper::to_segments(whisper_output)?;
        info!("Transcription produced {} segments", segments.len());
        Ok(segments)
    }

    fn name(&self) -> &'static str {
        TOOL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapper_converts_offsets() {
        let json = r#"{
            "result": {"language": "en"},
            "transcription": [
                {"timestamps": {"from": "00:00:00,000", "to": "00:00:03,200"},
                 "offsets": {"from": 0, "to": 3200}, "text": " Hello, world!"},
                {"timestamps": {"from": "00:00:03,300", "to": "00:00:05,000"},
                 "offsets": {"from": 3300, "to": 5000}, "text": " This is a test."}
            ]
        }"#;
        let output: WhisperCppOutput = serde_json::from_str(json).unwrap();
        let segments = WhisperCppMapper::to_segments(output).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::new(0.0, 3.2, "Hello, world!"),
                Segment::new(3.3, 5.0, "This is a test."),
            ]
        );
    }

    #[test]
    fn test_command_arguments() {
        let transcriber = WhisperCppTranscriber::new(TranscriberConfig {
            language: None,
            ..TranscriberConfig::default()
        });
        let command = transcriber.build_command(Path::new("audio.wav"), Path::new("/tmp/x/transcript"));
        let args: Vec<String> = command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            args,
            vec![
                "-m", ".diasub/models/ggml-base.bin", "-f", "audio.wav", "-l", "auto",
                "-oj", "-of", "/tmp/x/transcript",
            ]
        );
    }
}
