use crate::error::{DiasubError, Result};
use crate::segment::Segment;

use super::{Timecode, validate};

/// Render segments as SubRip text.
///
/// Blocks are numbered from 1 and separated by a single blank line; the
/// output ends with one newline. A speaker, when present, prefixes the text
/// as `"<speaker>: "`, or just `"<speaker>:"` when the text is empty.
pub fn to_srt(segments: &[Segment]) -> Result<String> {
    validate(segments)?;

    let blocks: Vec<String> = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let text = segment.text.trim();
            let body = match &segment.speaker {
                Some(speaker) if text.is_empty() => format!("{}:", speaker),
                Some(speaker) => format!("{}: {}", speaker, text),
                None => text.to_string(),
            };
            format!(
                "{}\n{} --> {}\n{}\n",
                index + 1,
                Timecode::from_seconds(segment.start).srt(),
                Timecode::from_seconds(segment.end).srt(),
                body
            )
        })
        .collect();

    Ok(blocks.join("\n"))
}

/// Parse SubRip text back into unlabeled segments.
///
/// The block body is kept verbatim, so a `"<speaker>: "` prefix stays part of
/// the text and re-rendering reproduces the input. A leading byte order
/// mark, CRLF line endings and extra blank lines are accepted.
pub fn parse_srt(content: &str) -> Result<Vec<Segment>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let normalized = content.replace("\r\n", "\n");
    let mut segments = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in normalized.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !block.is_empty() {
                segments.push(parse_block(segments.len(), &block)?);
                block.clear();
            }
        } else {
            block.push(line);
        }
    }

    Ok(segments)
}

fn parse_block(index: usize, lines: &[&str]) -> Result<Segment> {
    let mut lines = lines.iter();

    let counter = lines
        .next()
        .ok_or_else(|| DiasubError::malformed(index, "empty block"))?;
    counter
        .trim()
        .parse::<u64>()
        .map_err(|_| DiasubError::malformed(index, format!("invalid counter '{}'", counter)))?;

    let timing = lines
        .next()
        .ok_or_else(|| DiasubError::malformed(index, "missing timing line"))?;
    let (start, end) = timing
        .split_once("-->")
        .ok_or_else(|| DiasubError::malformed(index, format!("invalid timing line '{}'", timing)))?;

    let start = parse_timestamp(start.trim()).ok_or_else(|| {
        DiasubError::malformed(index, format!("invalid start time '{}'", start.trim()))
    })?;
    let end = parse_timestamp(end.trim()).ok_or_else(|| {
        DiasubError::malformed(index, format!("invalid end time '{}'", end.trim()))
    })?;

    let text = lines.copied().collect::<Vec<_>>().join("\n");
    Ok(Segment::new(start, end, text))
}

/// HH:MM:SS,mmm to seconds
fn parse_timestamp(value: &str) -> Option<f64> {
    let (clock, millis) = value.split_once(',')?;
    let mut parts = clock.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 || millis.len() != 3 {
        return None;
    }
    let millis: u64 = millis.parse().ok()?;

    let total = ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis;
    Some(total as f64 / 1000.0)
}
