use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, DiasubError};
use crate::segment::Segment;

/// Trait for converting service-specific transcription output to segments
pub trait TranscriptionMapper<T> {
    fn to_segments(service_output: T) -> Result<Vec<Segment>>;
}

/// Base utilities for whisper implementations
pub struct WhisperUtils;

impl WhisperUtils {
    /// Resolve a model name to a model file path.
    ///
    /// Anything that already looks like a path is returned as-is; bare names
    /// map to `<models_dir>/ggml-<name>.bin`.
    pub fn resolve_model_path(model: &str, models_dir: &Path) -> PathBuf {
        if model.contains('/') || model.ends_with(".bin") {
            return PathBuf::from(model);
        }
        models_dir.join(format!("ggml-{}.bin", model))
    }

    /// Run a transcriber command, failing on a non-zero exit
    pub async fn run(mut command: Command, tool: &str) -> Result<()> {
        debug!("Executing {} command: {:?}", tool, command);

        let output = command
            .output()
            .await
            .map_err(|e| DiasubError::Transcriber(format!("Failed to execute {}: {}", tool, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DiasubError::Transcriber(format!(
                "{} transcription failed: {}",
                tool,
                stderr.trim()
            )));
        }

        Ok(())
    }

    /// Read and deserialize a JSON file written by a transcriber
    pub async fn read_json<T: serde::de::DeserializeOwned>(path: &Path, tool: &str) -> Result<T> {
        if !path.exists() {
            return Err(DiasubError::Transcriber(format!(
                "{} JSON output file not found: {}",
                tool,
                path.display()
            )));
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DiasubError::Transcriber(format!("Failed to read {} output: {}", tool, e)))?;

        serde_json::from_str(&content)
            .map_err(|e| DiasubError::Transcriber(format!("Failed to parse {} JSON: {}", tool, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_model_path() {
        let models = Path::new(".diasub/models");
        assert_eq!(
            WhisperUtils::resolve_model_path("base", models),
            PathBuf::from(".diasub/models/ggml-base.bin")
        );
        assert_eq!(
            WhisperUtils::resolve_model_path("/models/custom.bin", models),
            PathBuf::from("/models/custom.bin")
        );
        assert_eq!(
            WhisperUtils::resolve_model_path("large-v3.bin", models),
            PathBuf::from("large-v3.bin")
        );
    }

    #[tokio::test]
    async fn test_read_json_missing_file() {
        let result: Result<serde_json::Value> =
            WhisperUtils::read_json(Path::new("/nonexistent/out.json"), "whisper").await;
        assert!(matches!(result, Err(DiasubError::Transcriber(_))));
    }
}
