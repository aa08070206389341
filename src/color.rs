use image::Rgba;

use crate::error::CaptionError;

/// Parses `#rrggbb` or the short `#rgb` form into an opaque color.
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>, CaptionError> {
    let invalid = || CaptionError::InvalidColor(value.to_string());
    let digits = value.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
    };
    match digits.len() {
        6 => Ok(Rgba([channel(0..2)?, channel(2..4)?, channel(4..6)?, 0xff])),
        // each short digit doubles: "f" -> "ff"
        3 => Ok(Rgba([
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
            0xff,
        ])),
        _ => Err(invalid()),
    }
}
