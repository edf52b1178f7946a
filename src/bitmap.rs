//! Source bitmaps and their pixel formats

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LayerError;

/// Storage format of a bitmap's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Two palette indices per byte, low nibble first
    Indexed4,
    /// One palette index per byte
    Indexed8,
    /// Little-endian RGB565
    Direct16,
    /// Little-endian `0xAARRGGBB`
    Direct32,
}

impl PixelFormat {
    /// Map a bit depth to a format.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::UnsupportedFormat`] for any depth other than
    /// 4, 8, 16 or 32.
    pub fn from_depth(bits: u8) -> Result<Self, LayerError> {
        match bits {
            4 => Ok(PixelFormat::Indexed4),
            8 => Ok(PixelFormat::Indexed8),
            16 => Ok(PixelFormat::Direct16),
            32 => Ok(PixelFormat::Direct32),
            other => Err(LayerError::UnsupportedFormat(other)),
        }
    }

    pub fn depth(self) -> u8 {
        match self {
            PixelFormat::Indexed4 => 4,
            PixelFormat::Indexed8 => 8,
            PixelFormat::Direct16 => 16,
            PixelFormat::Direct32 => 32,
        }
    }

    /// Minimum number of bytes needed to store one row of `width` pixels.
    pub fn min_pitch(self, width: u32) -> usize {
        let w = width as usize;
        match self {
            PixelFormat::Indexed4 => w.div_ceil(2),
            PixelFormat::Indexed8 => w,
            PixelFormat::Direct16 => w * 2,
            PixelFormat::Direct32 => w * 4,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bpp", self.depth())
    }
}

/// A raster image handed to the layer by a collaborator.
///
/// Pixel storage is shared (`Arc<[u8]>`), so cloning a bitmap is cheap and
/// the layer never copies pixels. The layer keeps its clone until the sprite
/// is removed or its bitmap is swapped with `replace_sprite_bitmap`.
///
/// A bitmap may exist without pixels (see [`Bitmap::unloaded`]); sprites
/// backed by it are registered normally but skipped at render time.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    format: PixelFormat,
    pitch: usize,
    pixels: Option<Arc<[u8]>>,
}

impl Bitmap {
    /// Create a bitmap with tightly packed rows.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidBitmap`] when either dimension is zero.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: impl Into<Arc<[u8]>>,
    ) -> Result<Self, LayerError> {
        Self::with_pitch(width, height, format, format.min_pitch(width), pixels)
    }

    /// Create a bitmap whose rows are `pitch` bytes apart.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidBitmap`] when either dimension is zero,
    /// the pitch cannot hold a row, or the rows span more than `usize` bytes.
    pub fn with_pitch(
        width: u32,
        height: u32,
        format: PixelFormat,
        pitch: usize,
        pixels: impl Into<Arc<[u8]>>,
    ) -> Result<Self, LayerError> {
        validate_geometry(width, height, format, pitch)?;
        Ok(Self { width, height, format, pitch, pixels: Some(pixels.into()) })
    }

    /// Create a bitmap whose pixels are not available yet.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidBitmap`] when either dimension is zero.
    pub fn unloaded(width: u32, height: u32, format: PixelFormat) -> Result<Self, LayerError> {
        let pitch = format.min_pitch(width);
        validate_geometry(width, height, format, pitch)?;
        Ok(Self { width, height, format, pitch, pixels: None })
    }

    /// Build a 32-bit bitmap from packed ARGB values.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidBitmap`] when either dimension is zero.
    pub fn from_argb(width: u32, height: u32, colors: &[u32]) -> Result<Self, LayerError> {
        let bytes: Vec<u8> = colors.iter().flat_map(|c| c.to_le_bytes()).collect();
        Self::new(width, height, PixelFormat::Direct32, bytes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes between the start of consecutive rows.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Raw pixel bytes, if present.
    pub fn pixels(&self) -> Option<&[u8]> {
        self.pixels.as_deref()
    }

    /// Pixel bytes if they cover every row, otherwise `None`.
    pub fn complete_pixels(&self) -> Option<&[u8]> {
        let needed = span(self.height, self.format.min_pitch(self.width), self.pitch)?;
        self.pixels().filter(|p| p.len() >= needed)
    }

    /// Bytes of row `y`, trimmed to the pixel payload.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let pixels = self.complete_pixels()?;
        if y >= self.height {
            return None;
        }
        let start = self.pitch.checked_mul(y as usize)?;
        pixels.get(start..start.checked_add(self.format.min_pitch(self.width))?)
    }

    pub fn same_dimensions(&self, other: &Bitmap) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("pitch", &self.pitch)
            .field("bytes", &self.pixels.as_ref().map(|p| p.len()))
            .finish()
    }
}

fn validate_geometry(
    width: u32,
    height: u32,
    format: PixelFormat,
    pitch: usize,
) -> Result<(), LayerError> {
    let reason = if width == 0 || height == 0 {
        "dimensions must be non-zero"
    } else if pitch < format.min_pitch(width) {
        "pitch is smaller than one row"
    } else if span(height, format.min_pitch(width), pitch).is_none() {
        "rows overflow the address space"
    } else {
        return Ok(());
    };
    Err(LayerError::InvalidBitmap { width, height, pitch, reason })
}

/// Bytes from the first row's start to the last row's end.
fn span(height: u32, row_bytes: usize, pitch: usize) -> Option<usize> {
    pitch.checked_mul(height.saturating_sub(1) as usize)?.checked_add(row_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_depth() {
        assert_eq!(PixelFormat::from_depth(4), Ok(PixelFormat::Indexed4));
        assert_eq!(PixelFormat::from_depth(32), Ok(PixelFormat::Direct32));
        assert_eq!(PixelFormat::from_depth(24), Err(LayerError::UnsupportedFormat(24)));
    }

    #[test]
    fn test_min_pitch() {
        assert_eq!(PixelFormat::Indexed4.min_pitch(5), 3);
        assert_eq!(PixelFormat::Indexed8.min_pitch(5), 5);
        assert_eq!(PixelFormat::Direct16.min_pitch(5), 10);
        assert_eq!(PixelFormat::Direct32.min_pitch(5), 20);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = Bitmap::new(0, 4, PixelFormat::Indexed8, Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, LayerError::InvalidBitmap { width: 0, .. }));
    }

    #[test]
    fn test_small_pitch_rejected() {
        let err = Bitmap::with_pitch(4, 1, PixelFormat::Direct16, 6, vec![0u8; 8]).unwrap_err();
        assert!(matches!(err, LayerError::InvalidBitmap { pitch: 6, .. }));
    }

    #[test]
    fn test_overflowing_pitch_rejected() {
        let err = Bitmap::with_pitch(1, 4, PixelFormat::Indexed8, usize::MAX / 2, vec![1u8; 4])
            .unwrap_err();
        assert!(matches!(err, LayerError::InvalidBitmap { height: 4, .. }));

        // A single row never multiplies the pitch
        let one_row =
            Bitmap::with_pitch(1, 1, PixelFormat::Indexed8, usize::MAX, vec![7u8]).unwrap();
        assert_eq!(one_row.row(0), Some(&[7u8][..]));
    }

    #[test]
    fn test_rows_respect_pitch() {
        let bmp = Bitmap::with_pitch(2, 2, PixelFormat::Indexed8, 4, vec![1u8, 2, 9, 9, 3, 4])
            .unwrap();
        assert_eq!(bmp.row(0), Some(&[1u8, 2][..]));
        assert_eq!(bmp.row(1), Some(&[3u8, 4][..]));
        assert_eq!(bmp.row(2), None);
    }

    #[test]
    fn test_truncated_pixels_are_incomplete() {
        let bmp = Bitmap::new(4, 4, PixelFormat::Indexed8, vec![0u8; 10]).unwrap();
        assert!(bmp.pixels().is_some());
        assert!(bmp.complete_pixels().is_none());
        assert!(bmp.row(0).is_none());
    }

    #[test]
    fn test_unloaded_has_no_pixels() {
        let bmp = Bitmap::unloaded(8, 8, PixelFormat::Indexed4).unwrap();
        assert!(bmp.pixels().is_none());
        assert_eq!(bmp.pitch(), 4);
    }
}
