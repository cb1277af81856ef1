use std::fmt;

use thiserror::Error;

/// Which side of the alignment an invalid interval came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalKind {
    Segment,
    Turn,
}

impl fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalKind::Segment => f.write_str("segment"),
            IntervalKind::Turn => f.write_str("diarization turn"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DiasubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid interval in {kind} #{index}: [{start}, {end}]")]
    InvalidInterval {
        kind: IntervalKind,
        index: usize,
        start: f64,
        end: f64,
    },

    #[error("Malformed segment #{index}: {reason}")]
    MalformedSegment { index: usize, reason: String },

    #[error("Unknown subtitle format: {0}")]
    UnknownFormat(String),

    #[error("Transcription error: {0}")]
    Transcriber(String),

    #[error("Diarization error: {0}")]
    Diarizer(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl DiasubError {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedSegment {
            index,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiasubError>;
