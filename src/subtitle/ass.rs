use crate::error::Result;
use crate::palette::SpeakerPalette;
use crate::segment::Segment;

use super::{Timecode, validate};

pub const SCRIPT_INFO: &str = "[Script Info]\n\
ScriptType: v4.00+\n\
Collisions: Normal\n\
PlayResX: 1920\n\
PlayResY: 1080\n\
Timer: 100.0000\n";

pub const STYLES: &str = "[V4+ Styles]\n\
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, \
Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, \
Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
Style: Default,Arial,36,&H00FFFFFF,&H000000FF,&H00000000,&H64000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1\n";

pub const EVENTS_FORMAT: &str = "[Events]\n\
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n";

/// Render segments as an ASS script.
///
/// Each labeled line carries the speaker in the `Name` field and an inline
/// `{\c&HBBGGRR}` override colored by first appearance of that speaker.
/// Unlabeled lines get an empty name and no override.
pub fn to_ass(segments: &[Segment]) -> Result<String> {
    validate(segments)?;

    let mut palette = SpeakerPalette::new();
    let mut ass_content = String::new();
    ass_content.push_str(SCRIPT_INFO);
    ass_content.push('\n');
    ass_content.push_str(STYLES);
    ass_content.push('\n');
    ass_content.push_str(EVENTS_FORMAT);

    for segment in segments {
        let (name, color_tag) = match &segment.speaker {
            Some(speaker) => {
                let color = palette.color_for(speaker);
                (name_field(speaker), format!("{{\\c&H{}}}", color.to_ass_bgr()))
            }
            None => (String::new(), String::new()),
        };

        ass_content.push_str(&format!(
            "Dialogue: 0,{},{},Default,{},0000,0000,0000,,{}{}\n",
            Timecode::from_seconds(segment.start).ass(),
            Timecode::from_seconds(segment.end).ass(),
            name,
            color_tag,
            escape_text(segment.text.trim())
        ));
    }

    Ok(ass_content)
}

/// `Name` is a comma-separated field, so commas and line breaks cannot appear
/// in it. Colors are still keyed on the original speaker id.
fn name_field(speaker: &str) -> String {
    speaker
        .trim()
        .chars()
        .map(|c| match c {
            ',' => ';',
            '\r' | '\n' => ' ',
            c => c,
        })
        .collect()
}

/// Hard line breaks are `\N` inside a Dialogue line
fn escape_text(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\\N")
}
