use plotters::style::RGBColor;

use crate::engine::Tag;

/// Twelve contrasting colors, dark enough to read on a white background.
pub const CONTRAST: [RGBColor; 12] = [
    RGBColor(0x80, 0x00, 0x00), // dark red
    RGBColor(0x00, 0x80, 0x00), // green
    RGBColor(0x00, 0x00, 0x66), // dark blue
    RGBColor(0xcc, 0x66, 0x00), // dark yellow
    RGBColor(0x00, 0x66, 0x66), // teal
    RGBColor(0x66, 0x00, 0xcc), // light purple
    RGBColor(0xb3, 0x00, 0x47), // magenta
    RGBColor(0x66, 0x99, 0x00), // light green
    RGBColor(0x00, 0x28, 0x4d), // dark blue
    RGBColor(0xb3, 0x2d, 0x00), // orange
    RGBColor(0x00, 0x73, 0x99), // light blue
    RGBColor(0x26, 0x00, 0x4d), // dark purple
];

pub const SEED_COLOR: RGBColor = RGBColor(0, 0, 0);

/// Color for a rule index, wrapping around the palette.
pub fn contrast(index: usize) -> RGBColor {
    CONTRAST[index % CONTRAST.len()]
}

/// Maps a palette-indexed tag to its drawing color.
pub fn tag_color(tag: &Tag<usize>) -> RGBColor {
    match tag {
        Tag::Seed => SEED_COLOR,
        Tag::Rule(index) => contrast(*index),
    }
}
