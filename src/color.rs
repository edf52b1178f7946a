//! 32-bit ARGB color helpers
//!
//! The compositor works on packed `0xAARRGGBB` values. This module converts
//! between that packing, 16-bit RGB565 source pixels, `image::Rgba<u8>` and
//! hex color strings used by palettes in scene and config files.
//!
//! Supported hex forms: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.

use image::Rgba;
use thiserror::Error;

/// Fully transparent black
pub const TRANSPARENT: u32 = 0x0000_0000;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Input string doesn't start with '#'
    #[error("color must start with '#'")]
    MissingHash,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// Pack four channels into `0xAARRGGBB`.
#[inline]
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Unpack `0xAARRGGBB` into `[a, r, g, b]`.
#[inline]
pub const fn channels(c: u32) -> [u8; 4] {
    [(c >> 24) as u8, (c >> 16) as u8, (c >> 8) as u8, c as u8]
}

#[inline]
pub const fn alpha(c: u32) -> u8 {
    (c >> 24) as u8
}

/// Expand an RGB565 pixel to opaque ARGB8888.
///
/// Each channel is widened by replicating its high bits so that full
/// intensity maps to 255.
#[inline]
pub const fn from_rgb565(p: u16) -> u32 {
    let r5 = ((p >> 11) & 0x1F) as u8;
    let g6 = ((p >> 5) & 0x3F) as u8;
    let b5 = (p & 0x1F) as u8;
    argb(0xFF, (r5 << 3) | (r5 >> 2), (g6 << 2) | (g6 >> 4), (b5 << 3) | (b5 >> 2))
}

/// Convert a packed color to an `image` pixel.
pub fn to_rgba(c: u32) -> Rgba<u8> {
    let [a, r, g, b] = channels(c);
    Rgba([r, g, b, a])
}

/// Parse a hex color string into a packed ARGB value.
///
/// # Examples
///
/// ```
/// use spritelayer::color::parse_color;
///
/// assert_eq!(parse_color("#F00").unwrap(), 0xFFFF0000);
/// assert_eq!(parse_color("#00FF0080").unwrap(), 0x8000FF00);
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is empty, lacks the leading `#`, has a
/// bad length or contains non-hex characters.
pub fn parse_color(s: &str) -> Result<u32, ColorError> {
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    let hex = s.strip_prefix('#').ok_or(ColorError::MissingHash)?;

    let digits = hex.chars().map(parse_hex_digit).collect::<Result<Vec<u8>, _>>()?;

    match digits.as_slice() {
        // #RGB -> #RRGGBB (doubled digits), alpha = 255
        [r, g, b] => Ok(argb(255, r * 17, g * 17, b * 17)),
        [r, g, b, a] => Ok(argb(a * 17, r * 17, g * 17, b * 17)),
        [r1, r0, g1, g0, b1, b0] => Ok(argb(255, r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0)),
        [r1, r0, g1, g0, b1, b0, a1, a0] => {
            Ok(argb(a1 * 16 + a0, r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0))
        }
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_roundtrip_channels() {
        let c = argb(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c, 0x1234_5678);
        assert_eq!(channels(c), [0x12, 0x34, 0x56, 0x78]);
        assert_eq!(alpha(c), 0x12);
    }

    #[test]
    fn test_rgb565_extremes() {
        assert_eq!(from_rgb565(0x0000), 0xFF00_0000);
        assert_eq!(from_rgb565(0xFFFF), 0xFFFF_FFFF);
        assert_eq!(from_rgb565(0xF800), 0xFFFF_0000);
        assert_eq!(from_rgb565(0x07E0), 0xFF00_FF00);
        assert_eq!(from_rgb565(0x001F), 0xFF00_00FF);
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_color("#F00"), Ok(0xFFFF_0000));
        assert_eq!(parse_color("#F008"), Ok(0x88FF_0000));
        assert_eq!(parse_color("#336699"), Ok(0xFF33_6699));
        assert_eq!(parse_color("#33669900"), Ok(0x0033_6699));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_color(""), Err(ColorError::Empty));
        assert_eq!(parse_color("F00"), Err(ColorError::MissingHash));
        assert_eq!(parse_color("#12345"), Err(ColorError::InvalidLength(5)));
        assert_eq!(parse_color("#GG0000"), Err(ColorError::InvalidHex('G')));
    }

    #[test]
    fn test_image_conversion() {
        let c = 0x80FF_2010;
        assert_eq!(to_rgba(c), Rgba([0xFF, 0x20, 0x10, 0x80]));
    }
}
