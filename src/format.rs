//! Per-format pixel fetch and palette lookup
//!
//! Rows are fetched through a column map produced by the scaling engine, so
//! the fetch loop only ever touches the source pixels that land on screen.
//! Indexed formats produce raw indices ([`SourceRun::Indices`]); direct
//! formats produce resolved ARGB colors ([`SourceRun::Colors`]). Blend
//! strategies resolve indices through a [`PaletteContext`] as they write.

use crate::bitmap::PixelFormat;
use crate::color::{self, TRANSPARENT};

/// One fetched run of source pixels, ready for a blend strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRun<'a> {
    /// Raw palette indices (4-bit and 8-bit formats)
    Indices(&'a [u8]),
    /// Resolved `0xAARRGGBB` colors (16-bit and 32-bit formats)
    Colors(&'a [u32]),
}

impl SourceRun<'_> {
    pub fn len(&self) -> usize {
        match self {
            SourceRun::Indices(i) => i.len(),
            SourceRun::Colors(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Palette slice selected for one sprite.
///
/// The effective base slot is `selector << shift`. Slots past the end of the
/// palette wrap around instead of reading out of bounds; an empty palette
/// resolves every index to transparent black.
#[derive(Debug, Clone, Copy)]
pub struct PaletteContext<'a> {
    palette: &'a [u32],
    base: usize,
}

impl<'a> PaletteContext<'a> {
    pub fn new(palette: &'a [u32], selector: u32, shift: u8) -> Self {
        let base = (u64::from(selector) << shift) as usize;
        Self { palette, base }
    }

    /// Base slot in the palette table.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Resolve a raw index to a color.
    #[inline]
    pub fn lookup(&self, index: u8) -> u32 {
        if self.palette.is_empty() {
            return TRANSPARENT;
        }
        let slot = self.base.wrapping_add(index as usize) % self.palette.len();
        self.palette[slot]
    }
}

/// Read the 4-bit index at column `x`.
///
/// Even columns live in the low nibble of a byte, odd columns in the high
/// nibble.
#[inline]
pub fn nibble_at(row: &[u8], x: usize) -> u8 {
    let byte = row[x / 2];
    if x % 2 == 0 {
        byte & 0x0F
    } else {
        byte >> 4
    }
}

/// Read the resolved color at column `x` of a row.
#[inline]
pub fn color_at(format: PixelFormat, row: &[u8], x: usize, palette: &PaletteContext<'_>) -> u32 {
    match format {
        PixelFormat::Indexed4 => palette.lookup(nibble_at(row, x)),
        PixelFormat::Indexed8 => palette.lookup(row[x]),
        PixelFormat::Direct16 => {
            let o = x * 2;
            color::from_rgb565(u16::from_le_bytes([row[o], row[o + 1]]))
        }
        PixelFormat::Direct32 => {
            let o = x * 4;
            u32::from_le_bytes([row[o], row[o + 1], row[o + 2], row[o + 3]])
        }
    }
}

/// Reusable per-sprite scratch buffers for fetched runs.
///
/// Buffers grow to the widest run requested and are reused across rows.
#[derive(Debug, Default)]
pub struct RowFetcher {
    indices: Vec<u8>,
    colors: Vec<u32>,
}

impl RowFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the pixels of `row` at the given absolute source columns.
    ///
    /// `row` must hold at least `format.min_pitch(width)` bytes and every
    /// column must be below `width`; the scaling engine guarantees both.
    pub fn fetch<'s>(
        &'s mut self,
        format: PixelFormat,
        row: &[u8],
        columns: &[u32],
        palette: &PaletteContext<'_>,
    ) -> SourceRun<'s> {
        self.indices.clear();
        match format {
            PixelFormat::Indexed4 => {
                self.indices.extend(columns.iter().map(|&x| nibble_at(row, x as usize)));
                SourceRun::Indices(&self.indices)
            }
            PixelFormat::Indexed8 => {
                self.indices.extend(columns.iter().map(|&x| row[x as usize]));
                SourceRun::Indices(&self.indices)
            }
            PixelFormat::Direct16 | PixelFormat::Direct32 => {
                self.colors.clear();
                let fetched = columns.iter().map(|&x| color_at(format, row, x as usize, palette));
                self.colors.extend(fetched);
                SourceRun::Colors(&self.colors)
            }
        }
    }
}

/// Resolve any run to colors.
pub fn resolve_run(src: SourceRun<'_>, palette: &PaletteContext<'_>, out: &mut Vec<u32>) {
    out.clear();
    match src {
        SourceRun::Indices(indices) => out.extend(indices.iter().map(|&i| palette.lookup(i))),
        SourceRun::Colors(colors) => out.extend_from_slice(colors),
    }
}
