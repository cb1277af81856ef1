//! Rich Transcription Time Marked (RTTM) speaker records.
//!
//! Only `SPEAKER` records are read:
//! `SPEAKER <file> <channel> <onset> <duration> <NA> <NA> <speaker> <NA> <NA>`

use crate::error::{DiasubError, Result};
use crate::segment::DiarizationTurn;

pub fn parse_rttm(content: &str) -> Result<Vec<DiarizationTurn>> {
    let mut turns = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields[0] != "SPEAKER" {
            continue;
        }
        if fields.len() < 8 {
            return Err(invalid(line_no, "expected at least 8 fields"));
        }

        let onset: f64 = fields[3]
            .parse()
            .map_err(|_| invalid(line_no, &format!("invalid onset '{}'", fields[3])))?;
        let duration: f64 = fields[4]
            .parse()
            .map_err(|_| invalid(line_no, &format!("invalid duration '{}'", fields[4])))?;

        turns.push(DiarizationTurn::new(onset, onset + duration, fields[7]));
    }

    Ok(turns)
}

fn invalid(line_no: usize, reason: &str) -> DiasubError {
    DiasubError::Diarizer(format!("RTTM line {}: {}", line_no + 1, reason))
}
