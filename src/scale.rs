//! Fixed-point nearest-neighbor scaling
//!
//! Scales are signed fixed-point ratios with [`Scale::UNIT`] (1024) as 1.0x.
//! Negative values mirror along the axis. Sampling is driven by a step
//! accumulator: every source pixel adds `|scale|` units and every full unit
//! emits one destination sample from that source pixel. The accumulator
//! starts at half a unit, so an axis of `len` source pixels scales to
//! `round(len * |scale| / 1024)` destination pixels.
//!
//! The inner loops never divide; only seeking to the first visible sample
//! does, once per sprite and axis.

use serde::{Deserialize, Serialize};

use crate::error::LayerError;

/// Signed fixed-point scale factor. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Scale(i32);

impl Scale {
    /// Fixed-point unit: 1024 = 1.0x
    pub const UNIT: i32 = 1024;
    const UNIT_U64: u64 = Self::UNIT as u64;
    const HALF_U64: u64 = Self::UNIT_U64 / 2;

    /// Identity scale.
    pub const IDENTITY: Scale = Scale(Self::UNIT);

    /// Create a scale from its raw fixed-point value.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidScale`] for zero.
    pub fn new(raw: i32) -> Result<Self, LayerError> {
        if raw == 0 {
            Err(LayerError::InvalidScale)
        } else {
            Ok(Scale(raw))
        }
    }

    /// Raw fixed-point value.
    pub fn get(self) -> i32 {
        self.0
    }

    pub fn magnitude(self) -> u32 {
        self.0.unsigned_abs()
    }

    pub fn is_mirrored(self) -> bool {
        self.0 < 0
    }

    /// Scaled length of an axis with `len` source pixels.
    pub fn extent(self, len: u32) -> u32 {
        scaled_extent(len, self)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::IDENTITY
    }
}

impl TryFrom<i32> for Scale {
    type Error = LayerError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Scale::new(raw)
    }
}

impl From<Scale> for i32 {
    fn from(s: Scale) -> i32 {
        s.0
    }
}

/// `round(len * |scale| / 1024)`, halves rounding up.
pub fn scaled_extent(len: u32, scale: Scale) -> u32 {
    let mag = u64::from(scale.magnitude());
    if mag == Scale::UNIT_U64 {
        return len;
    }
    let scaled = (u64::from(len) * mag + Scale::HALF_U64) / Scale::UNIT_U64;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Accumulator-driven iterator over the source index feeding each
/// destination sample, in forward (unmirrored) order.
#[derive(Debug, Clone)]
pub struct SourceSteps {
    len: u32,
    mag: u64,
    acc: u64,
    current: u32,
    next_src: u32,
}

impl SourceSteps {
    /// Steps for an axis of `len` source pixels, starting at destination 0.
    pub fn new(len: u32, scale: Scale) -> Self {
        let mag = u64::from(scale.magnitude());
        Self { len, mag, acc: Scale::HALF_U64, current: 0, next_src: 0 }
    }

    /// Steps starting at destination sample `dest`.
    ///
    /// Seeks in constant time: source `s` feeds `dest` when
    /// `512 + (s + 1) * mag >= (dest + 1) * 1024` first holds.
    pub fn starting_at(len: u32, scale: Scale, dest: u32) -> Self {
        let mag = u64::from(scale.magnitude());
        let need = (u64::from(dest) + 1) * Scale::UNIT_U64 - Scale::HALF_U64;
        let s = need.div_ceil(mag).saturating_sub(1);
        if s >= u64::from(len) {
            return Self { len, mag, acc: 0, current: len, next_src: len };
        }
        let acc = Scale::HALF_U64 + (s + 1) * mag - u64::from(dest) * Scale::UNIT_U64;
        let s = s as u32;
        Self { len, mag, acc, current: s, next_src: s + 1 }
    }
}

impl Iterator for SourceSteps {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        while self.acc < Scale::UNIT_U64 {
            if self.next_src >= self.len {
                return None;
            }
            self.current = self.next_src;
            self.next_src += 1;
            self.acc += self.mag;
        }
        self.acc -= Scale::UNIT_U64;
        Some(self.current)
    }
}

/// Source indices for destination samples `[skip, skip + take)` of an axis.
///
/// Indices are relative to the start of the axis (the slice origin). For a
/// mirrored scale the result is the reversed sample order of the unmirrored
/// scale with the same magnitude. `take` is clamped to the scaled extent.
pub fn sample_map(len: u32, scale: Scale, skip: u32, take: u32, out: &mut Vec<u32>) {
    out.clear();
    let extent = scaled_extent(len, scale);
    if skip >= extent {
        return;
    }
    let take = take.min(extent - skip);
    // Forward-order position of the first sample to produce
    let first = if scale.is_mirrored() { extent - skip - take } else { skip };

    if scale.magnitude() == Scale::UNIT as u32 {
        out.extend(first..first + take);
    } else {
        out.extend(SourceSteps::starting_at(len, scale, first).take(take as usize));
    }

    if scale.is_mirrored() {
        out.reverse();
    }
}

/// Horizontal column map: slice-relative columns for visible destination
/// columns, offset to absolute source columns by `origin`.
pub fn column_map(len: u32, scale: Scale, skip: u32, take: u32, origin: u32, out: &mut Vec<u32>) {
    sample_map(len, scale, skip, take, out);
    if origin != 0 {
        out.iter_mut().for_each(|x| *x += origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_map(len: u32, raw: i32) -> Vec<u32> {
        let scale = Scale::new(raw).unwrap();
        let mut out = Vec::new();
        sample_map(len, scale, 0, u32::MAX, &mut out);
        out
    }

    #[test]
    fn test_zero_scale_rejected() {
        assert_eq!(Scale::new(0), Err(LayerError::InvalidScale));
        assert!(Scale::try_from(0).is_err());
    }

    #[test]
    fn test_extent_matches_rounding() {
        for raw in [512, 1024, 2048] {
            let scale = Scale::new(raw).unwrap();
            for len in [1u32, 3, 15, 16, 17, 100] {
                let expected = ((len as f64) * (raw as f64) / 1024.0).round() as u32;
                assert_eq!(scaled_extent(len, scale), expected, "len {len} scale {raw}");
            }
        }
    }

    #[test]
    fn test_extent_negative_matches_positive() {
        let pos = Scale::new(1536).unwrap();
        let neg = Scale::new(-1536).unwrap();
        assert_eq!(scaled_extent(10, pos), scaled_extent(10, neg));
    }

    #[test]
    fn test_steps_count_equals_extent() {
        for raw in [1, 100, 333, 512, 700, 1024, 1500, 2048, 5000] {
            let scale = Scale::new(raw).unwrap();
            for len in [1u32, 2, 7, 16, 31] {
                let n = SourceSteps::new(len, scale).count() as u32;
                assert_eq!(n, scaled_extent(len, scale), "len {len} scale {raw}");
            }
        }
    }

    #[test]
    fn test_identity_is_copy() {
        assert_eq!(full_map(5, 1024), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_double_repeats_each_pixel() {
        assert_eq!(full_map(4, 2048), vec![0, 0, 1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_half_drops_every_other_pixel() {
        assert_eq!(full_map(8, 512), vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_mirror_reverses_sample_order() {
        assert_eq!(full_map(5, -1024), vec![4, 3, 2, 1, 0]);
        let mut forward = full_map(7, 1536);
        forward.reverse();
        assert_eq!(full_map(7, -1536), forward);
    }

    #[test]
    fn test_seek_matches_sequential() {
        for raw in [300, 512, 1000, 1024, 1900, 3072] {
            let scale = Scale::new(raw).unwrap();
            let all: Vec<u32> = SourceSteps::new(13, scale).collect();
            for start in 0..all.len() as u32 {
                let seeked: Vec<u32> = SourceSteps::starting_at(13, scale, start).collect();
                assert_eq!(seeked, all[start as usize..], "scale {raw} start {start}");
            }
        }
    }

    #[test]
    fn test_seek_past_end_is_empty() {
        let scale = Scale::new(2048).unwrap();
        assert_eq!(SourceSteps::starting_at(4, scale, 8).count(), 0);
    }

    #[test]
    fn test_window_of_mirrored_map() {
        let scale = Scale::new(-2048).unwrap();
        let mut out = Vec::new();
        // Full mirrored map of 3 px at 2x: [2, 2, 1, 1, 0, 0]
        sample_map(3, scale, 1, 3, &mut out);
        assert_eq!(out, vec![2, 1, 1]);
    }

    #[test]
    fn test_column_map_applies_origin() {
        let mut out = Vec::new();
        column_map(3, Scale::IDENTITY, 1, 2, 10, &mut out);
        assert_eq!(out, vec![11, 12]);
    }

    #[test]
    fn test_skip_beyond_extent() {
        let mut out = vec![99];
        sample_map(4, Scale::IDENTITY, 4, 10, &mut out);
        assert!(out.is_empty());
    }
}
