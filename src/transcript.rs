//! Transcript and diarization files on disk.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::diarize::rttm;
use crate::error::{DiasubError, Result};
use crate::segment::{DiarizationTurn, Segment};

/// A segment as found in a transcript file. Text may be missing or null there.
#[derive(Debug, Deserialize)]
struct RawSegment {
    start: f64,
    end: f64,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    speaker: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTranscript {
    segments: Vec<RawSegment>,
}

#[derive(Debug, Serialize)]
struct TranscriptRef<'a> {
    segments: &'a [Segment],
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TurnsDocument {
    Bare(Vec<DiarizationTurn>),
    Wrapped {
        #[serde(alias = "segments")]
        turns: Vec<DiarizationTurn>,
    },
}

/// Parse a `{"segments": [...]}` transcript. Unknown keys are ignored, so raw
/// whisper JSON loads directly.
pub fn parse_transcript(content: &str) -> Result<Vec<Segment>> {
    let raw: RawTranscript = serde_json::from_str(content)?;
    raw.segments
        .into_iter()
        .enumerate()
        .map(|(index, seg)| {
            let text = seg
                .text
                .ok_or_else(|| DiasubError::malformed(index, "text is missing or null"))?;
            Ok(Segment {
                start: seg.start,
                end: seg.end,
                text,
                speaker: seg.speaker,
            })
        })
        .collect()
}

pub async fn load_transcript<P: AsRef<Path>>(path: P) -> Result<Vec<Segment>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DiasubError::FileNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path).await?;
    let segments = parse_transcript(&content)?;
    debug!("Loaded {} segments from {}", segments.len(), path.display());
    Ok(segments)
}

pub fn transcript_to_json(segments: &[Segment]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&TranscriptRef { segments })?)
}

pub async fn save_transcript<P: AsRef<Path>>(path: P, segments: &[Segment]) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, transcript_to_json(segments)?).await?;
    debug!("Saved {} segments to {}", segments.len(), path.display());
    Ok(())
}

/// Parse diarization turns from JSON: a bare array, or an object holding
/// `turns` (or `segments`)
pub fn parse_turns_json(content: &str) -> Result<Vec<DiarizationTurn>> {
    let document: TurnsDocument = serde_json::from_str(content)?;
    Ok(match document {
        TurnsDocument::Bare(turns) => turns,
        TurnsDocument::Wrapped { turns } => turns,
    })
}

/// Load diarization turns from an RTTM (`.rttm`) or JSON file
pub async fn load_turns<P: AsRef<Path>>(path: P) -> Result<Vec<DiarizationTurn>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DiasubError::FileNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path).await?;

    let is_rttm = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("rttm"));

    let turns = if is_rttm {
        rttm::parse_rttm(&content)?
    } else {
        parse_turns_json(&content)?
    };
    debug!("Loaded {} diarization turns from {}", turns.len(), path.display());
    Ok(turns)
}
