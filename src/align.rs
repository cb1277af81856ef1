//! Speaker assignment by maximal temporal overlap.
//!
//! Transcription segments and diarization turns are produced independently,
//! so their boundaries never agree exactly. Each segment takes the speaker of
//! the turn it overlaps the longest. Ties, including a segment that overlaps
//! nothing, resolve to the earliest turn in the input sequence so the same
//! inputs always produce the same labels.

use crate::error::{DiasubError, IntervalKind, Result};
use crate::segment::{DiarizationTurn, Interval, Segment};

/// Duration in seconds during which both intervals occur
pub fn overlap<A, B>(a: &A, b: &B) -> f64
where
    A: Interval + ?Sized,
    B: Interval + ?Sized,
{
    (a.end().min(b.end()) - a.start().max(b.start())).max(0.0)
}

/// What a segment receives when no turn overlaps it
#[derive(Debug, Clone, Default, PartialEq)]
pub enum UnmatchedPolicy {
    /// Fall through to the tie-break: the earliest turn wins
    #[default]
    EarliestTurn,
    /// Use a fixed label such as "Speaker Unknown"
    Label(String),
}

#[derive(Debug, Clone, Default)]
pub struct AlignOptions {
    pub unmatched: UnmatchedPolicy,
}

impl AlignOptions {
    pub fn with_unknown_label(label: Option<String>) -> Self {
        Self {
            unmatched: label.map_or(UnmatchedPolicy::EarliestTurn, UnmatchedPolicy::Label),
        }
    }
}

/// Label every segment with the speaker of its best-overlapping turn.
///
/// The output has the same length and order as `segments`. With no turns at
/// all, every segment comes back with `speaker: None`.
pub fn align(segments: &[Segment], turns: &[DiarizationTurn]) -> Result<Vec<Segment>> {
    align_with(segments, turns, &AlignOptions::default())
}

pub fn align_with(
    segments: &[Segment],
    turns: &[DiarizationTurn],
    options: &AlignOptions,
) -> Result<Vec<Segment>> {
    validate(segments, IntervalKind::Segment)?;
    validate(turns, IntervalKind::Turn)?;

    Ok(segments
        .iter()
        .map(|segment| Segment {
            speaker: assign(segment, turns, options),
            ..segment.clone()
        })
        .collect())
}

fn validate<I: Interval>(items: &[I], kind: IntervalKind) -> Result<()> {
    match items.iter().position(|item| !item.is_well_formed()) {
        Some(index) => Err(DiasubError::InvalidInterval {
            kind,
            index,
            start: items[index].start(),
            end: items[index].end(),
        }),
        None => Ok(()),
    }
}

fn assign(segment: &Segment, turns: &[DiarizationTurn], options: &AlignOptions) -> Option<String> {
    let (turn, matched) = best_turn(segment, turns)?;
    match &options.unmatched {
        UnmatchedPolicy::Label(label) if !matched => Some(label.clone()),
        _ => Some(turn.speaker.clone()),
    }
}

/// Returns the winning turn and whether it actually touches the segment
fn best_turn<'a>(segment: &Segment, turns: &'a [DiarizationTurn]) -> Option<(&'a DiarizationTurn, bool)> {
    let mut best: Option<(&DiarizationTurn, f64, bool)> = None;

    for turn in turns {
        let amount = overlap(segment, turn);
        // An instant has no duration to share, so containment counts as a match
        let matched = amount > 0.0 || (segment.is_instant() && turn.contains(segment.start));

        // Strict comparisons keep the earliest turn on ties
        let better = match best {
            None => true,
            Some((_, best_amount, best_matched)) => {
                (matched && !best_matched) || (matched == best_matched && amount > best_amount)
            }
        };

        if better {
            best = Some((turn, amount, matched));
        }
    }

    best.map(|(turn, _, matched)| (turn, matched))
}
