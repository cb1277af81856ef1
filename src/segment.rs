//! Timestamped units shared by every pipeline stage.

use serde::{Deserialize, Serialize};

/// A closed time interval in seconds
pub trait Interval {
    fn start(&self) -> f64;
    fn end(&self) -> f64;

    /// Zero-duration interval
    fn is_instant(&self) -> bool {
        self.start() == self.end()
    }

    fn contains(&self, instant: f64) -> bool {
        self.start() <= instant && instant <= self.end()
    }

    fn is_well_formed(&self) -> bool {
        self.start().is_finite() && self.end().is_finite() && self.end() >= self.start()
    }
}

/// One unit of transcribed speech, optionally attributed to a speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            speaker: None,
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }
}

impl Interval for Segment {
    fn start(&self) -> f64 {
        self.start
    }

    fn end(&self) -> f64 {
        self.end
    }
}

/// A continuous stretch of audio attributed to one speaker by a diarization model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiarizationTurn {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
}

impl DiarizationTurn {
    pub fn new(start: f64, end: f64, speaker: impl Into<String>) -> Self {
        Self {
            start,
            end,
            speaker: speaker.into(),
        }
    }
}

impl Interval for DiarizationTurn {
    fn start(&self) -> f64 {
        self.start
    }

    fn end(&self) -> f64 {
        self.end
    }
}
