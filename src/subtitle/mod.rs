//! Subtitle synthesis.
//!
//! Renders labeled segments into SubRip (`.srt`) or Advanced SubStation
//! Alpha (`.ass`) text. Rendering is pure: callers decide where the text goes.

pub mod ass;
pub mod srt;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DiasubError, Result};
use crate::segment::{Interval, Segment};

pub use ass::to_ass;
pub use srt::{parse_srt, to_srt};

/// Supported subtitle formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Ass,
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Ass => "ass",
        }
    }

    /// Infer the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| DiasubError::UnknownFormat(path.display().to_string()))?;
        extension.parse()
    }
}

impl FromStr for SubtitleFormat {
    type Err = DiasubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "srt" => Ok(SubtitleFormat::Srt),
            "ass" => Ok(SubtitleFormat::Ass),
            _ => Err(DiasubError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Render segments in the requested format
pub fn render(format: SubtitleFormat, segments: &[Segment]) -> Result<String> {
    match format {
        SubtitleFormat::Srt => to_srt(segments),
        SubtitleFormat::Ass => to_ass(segments),
    }
}

/// A point in time broken into clock components, rounded to the millisecond
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Timecode {
    hours: u64,
    minutes: u64,
    seconds: u64,
    millis: u64,
}

impl Timecode {
    pub(crate) fn from_seconds(seconds: f64) -> Self {
        // Round rather than truncate: 3.3 * 1000.0 is 3299.999...
        let total_milliseconds = (seconds * 1000.0).round() as u64;
        Self {
            hours: total_milliseconds / 3_600_000,
            minutes: (total_milliseconds % 3_600_000) / 60_000,
            seconds: (total_milliseconds % 60_000) / 1_000,
            millis: total_milliseconds % 1_000,
        }
    }

    /// HH:MM:SS,mmm
    pub(crate) fn srt(&self) -> String {
        format!(
            "{:02}:{:02}:{:02},{:03}",
            self.hours, self.minutes, self.seconds, self.millis
        )
    }

    /// H:MM:SS.cc
    pub(crate) fn ass(&self) -> String {
        format!(
            "{}:{:02}:{:02}.{:02}",
            self.hours,
            self.minutes,
            self.seconds,
            self.millis / 10
        )
    }
}

/// Reject segments that cannot be rendered as-is
pub(crate) fn validate(segments: &[Segment]) -> Result<()> {
    for (index, segment) in segments.iter().enumerate() {
        if !segment.start.is_finite() || !segment.end.is_finite() {
            return Err(DiasubError::malformed(index, "non-finite timestamp"));
        }
        if segment.start < 0.0 {
            return Err(DiasubError::malformed(
                index,
                format!("negative start {}", segment.start),
            ));
        }
        if !segment.is_well_formed() {
            return Err(DiasubError::malformed(
                index,
                format!("end {} precedes start {}", segment.end, segment.start),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_srt_time() {
        assert_eq!(Timecode::from_seconds(0.0).srt(), "00:00:00,000");
        assert_eq!(Timecode::from_seconds(65.123).srt(), "00:01:05,123");
        assert_eq!(Timecode::from_seconds(3661.500).srt(), "01:01:01,500");
        assert_eq!(Timecode::from_seconds(3.3).srt(), "00:00:03,300");
    }

    #[test]
    fn test_srt_hours_widen_past_99() {
        assert_eq!(Timecode::from_seconds(99.0 * 3600.0).srt(), "99:00:00,000");
        assert_eq!(Timecode::from_seconds(100.0 * 3600.0 + 1.0).srt(), "100:00:01,000");
    }

    #[test]
    fn test_format_ass_time() {
        assert_eq!(Timecode::from_seconds(0.0).ass(), "0:00:00.00");
        assert_eq!(Timecode::from_seconds(3.2).ass(), "0:00:03.20");
        assert_eq!(Timecode::from_seconds(65.129).ass(), "0:01:05.12");
        assert_eq!(Timecode::from_seconds(3661.5).ass(), "1:01:01.50");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("srt".parse::<SubtitleFormat>().unwrap(), SubtitleFormat::Srt);
        assert_eq!("ASS".parse::<SubtitleFormat>().unwrap(), SubtitleFormat::Ass);
        assert_eq!(".ass".parse::<SubtitleFormat>().unwrap(), SubtitleFormat::Ass);
        assert!(matches!(
            "vtt".parse::<SubtitleFormat>(),
            Err(DiasubError::UnknownFormat(name)) if name == "vtt"
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SubtitleFormat::from_path("out/movie.ASS").unwrap(), SubtitleFormat::Ass);
        assert_eq!(SubtitleFormat::from_path("movie.srt").unwrap(), SubtitleFormat::Srt);
        assert!(SubtitleFormat::from_path("movie").is_err());
        assert!(SubtitleFormat::from_path("movie.sub").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_timing() {
        assert!(validate(&[Segment::new(1.0, 1.0, "")]).is_ok());
        assert!(matches!(
            validate(&[Segment::new(0.0, 1.0, "a"), Segment::new(2.0, 1.0, "b")]),
            Err(DiasubError::MalformedSegment { index: 1, .. })
        ));
        assert!(validate(&[Segment::new(-1.0, 1.0, "a")]).is_err());
        assert!(validate(&[Segment::new(0.0, f64::INFINITY, "a")]).is_err());
    }
}
