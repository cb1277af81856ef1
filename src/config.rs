use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, DiasubError};

fn default_language() -> Option<String> {
    Some("en".to_string())
}

fn default_models_dir() -> PathBuf {
    PathBuf::from(".diasub").join("models")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transcriber: TranscriberConfig,
    #[serde(default)]
    pub diarizer: DiarizerConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub subtitle: SubtitleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Which speech recognition CLI to drive
    pub implementation: TranscriberImplementation,
    /// Path to the transcriber binary (e.g., whisper-cli or whisper)
    pub binary_path: String,
    /// Model name ("base", "small", ...) or a path to a model file
    pub model: String,
    /// Spoken language; None lets the model detect it
    #[serde(default = "default_language")]
    pub language: Option<String>,
    /// Where whisper.cpp ggml models are looked up by name
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriberImplementation {
    /// whisper.cpp command line (whisper-cli)
    WhisperCpp,
    /// OpenAI Whisper Python command line (whisper)
    OpenAI,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiarizerConfig {
    /// Run diarization as part of `process`
    pub enabled: bool,
    /// External diarization command producing RTTM
    pub binary_path: String,
    /// Arguments; `{audio}`, `{output}` and `{model}` are substituted
    pub args: Vec<String>,
    /// Diarization model identifier passed through `{model}`
    pub model: String,
    /// HuggingFace token exported as HF_TOKEN; falls back to the environment
    #[serde(default)]
    pub hf_token: Option<String>,
    /// Label for segments no turn overlaps; unset keeps the earliest-turn rule
    #[serde(default)]
    pub unknown_speaker: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Sample rate of the extracted audio
    pub sample_rate: u32,
    /// Channel count of the extracted audio
    pub channels: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleConfig {
    /// Format used when neither --format nor the output extension decides
    pub format: String,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            implementation: TranscriberImplementation::WhisperCpp,
            binary_path: "whisper-cli".to_string(),
            model: "base".to_string(),
            language: default_language(),
            models_dir: default_models_dir(),
        }
    }
}

impl Default for DiarizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            binary_path: "pyannote-diarize".to_string(),
            args: vec![
                "--model".to_string(),
                "{model}".to_string(),
                "--rttm".to_string(),
                "{output}".to_string(),
                "{audio}".to_string(),
            ],
            model: "pyannote/speaker-diarization".to_string(),
            hf_token: None,
            unknown_speaker: None,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            sample_rate: 16000,
            channels: 1,
        }
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            format: "srt".to_string(),
        }
    }
}

impl DiarizerConfig {
    /// Configured token, or HF_TOKEN from the environment
    pub fn resolve_token(&self) -> Option<String> {
        self.hf_token
            .clone()
            .filter(|token| !token.is_empty())
            .or_else(|| std::env::var("HF_TOKEN").ok().filter(|token| !token.is_empty()))
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DiasubError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| DiasubError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DiasubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| DiasubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
