// OpenAI Whisper Python command line

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::{info, debug};

use crate::config::TranscriberConfig;
use crate::error::{Result, DiasubError};
use crate::segment::Segment;
use super::{Transcriber, TranscriptionMapper, WhisperUtils};

const TOOL: &str = "OpenAI Whisper";

/// OpenAI Whisper specific JSON output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIWhisperOutput {
    pub text: String,
    pub segments: Vec<OpenAIWhisperSegment>,
    pub language: Option<String>,
}

/// OpenAI Whisper specific segment format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIWhisperSegment {
    pub id: u64,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

pub struct OpenAIWhisperMapper;

impl TranscriptionMapper<OpenAIWhisperOutput> for OpenAIWhisperMapper {
    fn to_segments(whisper_output: OpenAIWhisperOutput) -> Result<Vec<Segment>> {
        Ok(whisper_output
            .segments
            .into_iter()
            .map(|seg| Segment::new(seg.start, seg.end, seg.text.trim()))
            .collect())
    }
}

/// OpenAI Whisper implementation
pub struct OpenAITranscriber {
    config: TranscriberConfig,
}

impl OpenAITranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, audio_path: &Path, output_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg(audio_path)
            .arg("--model").arg(&self.config.model)
            .arg("--output_dir").arg(output_dir)
            .arg("--output_format").arg("json");

        if let Some(lang) = &self.config.language {
            cmd.arg("--language").arg(lang);
        }
        cmd
    }
}

#[async_trait]
impl Transcriber for OpenAITranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Segment>> {
        info!("Transcribing {} with OpenAI Whisper model '{}'", audio_path.display(), self.config.model);

        // Create temporary output directory for whisper results
        let temp_dir = tempfile::tempdir()
            .map_err(|e| DiasubError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        WhisperUtils::run(self.build_command(audio_path, output_dir), TOOL).await?;

        // whisper names its output after the input file
        let audio_filename = audio_path.file_stem()
            .ok_or_else(|| DiasubError::Transcriber("Invalid audio filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", audio_filename.to_string_lossy()));

        let whisper_output: OpenAIWhisperOutput = WhisperUtils::read_json(&json_file, TOOL).await?;
        debug!("Whisper full text: {}", whisper_output.text.trim());
        if let Some(language) = &whisper_output.language {
            info!("OpenAI Whisper language: {}", language);
        }

        let segments = OpenAIWhisperMapper::to_segments(whisper_output)?;
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
    fn test_mapper_trims_text() {
        let json = r#"{
            "text": " Hello, world! This is a test.",
            "language": "en",
            "segments": [
                {"id": 0, "seek": 0, "start": 0.0, "end": 3.2, "text": " Hello, world!", "avg_logprob": -0.2},
                {"id": 1, "seek": 0, "start": 3.3, "end": 5.0, "text": " This is a test."}
            ]
        }"#;
        let output: OpenAIWhisperOutput = serde_json::from_str(json).unwrap();
        let segments = OpenAIWhisperMapper::to_segments(output).unwrap();
        assert_eq!(segments[0], Segment::new(0.0, 3.2, "Hello, world!"));
        assert_eq!(segments[1].text, "This is a test.");
    }

    #[test]
    fn test_language_flag_is_optional() {
        let mut config = TranscriberConfig::default();
        config.binary_path = "whisper".to_string();
        config.language = None;
        let command = OpenAITranscriber::new(config).build_command(Path::new("a.wav"), Path::new("out"));
        let args: Vec<String> = command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            args,
            vec!["a.wav", "--model", "base", "--output_dir", "out", "--output_format", "json"]
        );
    }
}
