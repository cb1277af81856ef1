use std::collections::HashMap;

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hex digits in the blue-green-red order ASS color tags expect
    pub fn to_ass_bgr(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.b, self.g, self.r)
    }
}

/// Speaker colors in assignment order
pub const SPEAKER_COLORS: [Color; 6] = [
    Color::rgb(0x00, 0xFF, 0x00), // green
    Color::rgb(0x00, 0x00, 0xFF), // blue
    Color::rgb(0xFF, 0x00, 0x00), // red
    Color::rgb(0x00, 0xFF, 0xFF), // cyan
    Color::rgb(0xFF, 0x00, 0xFF), // magenta
    Color::rgb(0xFF, 0xFF, 0x00), // yellow
];

/// Assigns colors to speakers in the order they are first seen.
///
/// The Nth distinct speaker gets `SPEAKER_COLORS[N % len]`. Once assigned, a
/// speaker keeps its color for the lifetime of the palette, which is one
/// rendering pass.
#[derive(Debug, Default)]
pub struct SpeakerPalette {
    slots: HashMap<String, usize>,
}

impl SpeakerPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(&mut self, speaker: &str) -> Color {
        let next = self.slots.len();
        let slot = *self.slots.entry(speaker.to_string()).or_insert(next);
        SPEAKER_COLORS[slot % SPEAKER_COLORS.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order() {
        let mut palette = SpeakerPalette::new();
        assert_eq!(palette.color_for("Speaker 2"), SPEAKER_COLORS[0]);
        assert_eq!(palette.color_for("Speaker 1"), SPEAKER_COLORS[1]);
        assert_eq!(palette.color_for("Speaker 2"), SPEAKER_COLORS[0]);
        assert_eq!(palette.color_for("Speaker 3"), SPEAKER_COLORS[2]);
    }

    #[test]
    fn test_wraps_around_when_speakers_exceed_palette() {
        let mut palette = SpeakerPalette::new();
        let colors: Vec<Color> = (0..8).map(|i| palette.color_for(&format!("S{i}"))).collect();
        assert_eq!(colors[6], SPEAKER_COLORS[0]);
        assert_eq!(colors[7], SPEAKER_COLORS[1]);
        assert_eq!(palette.color_for("S6"), SPEAKER_COLORS[0]);
    }

    #[test]
    fn test_bgr_serialization() {
        assert_eq!(Color::rgb(0x12, 0x34, 0x56).to_ass_bgr(), "563412");
        assert_eq!(SPEAKER_COLORS[1].to_ass_bgr(), "FF0000");
        assert_eq!(SPEAKER_COLORS[2].to_ass_bgr(), "0000FF");
    }
}
