//! Splits the visible arc of the border into short, individually colored segments.

use crate::{core::Rgb8, ramp::ColorRamp};

/// Minimum number of segments per frame, regardless of how short the visible arc is.
pub const MIN_SEGMENTS: usize = 50;

/// Target arc length covered by one segment once the visible arc is long enough to exceed
/// [`MIN_SEGMENTS`].
pub const SEGMENT_SPACING: f64 = 10.0;

/// One colored piece of the visible arc.
///
/// Both ends are wrapped into `[0, total_length)`. `arc_end <= arc_start` means the piece
/// crosses the path's start point and draws as two fragments.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Segment {
    pub arc_start: f64,
    pub arc_end: f64,
    pub color: Rgb8,
}

impl Segment {
    pub fn wraps(&self) -> bool {
        self.arc_end <= self.arc_start
    }
}

/// Number of segments used for a visible arc of `visible_length`.
pub fn segment_count(visible_length: f64) -> usize {
    let dense = (visible_length / SEGMENT_SPACING).floor();
    if dense.is_finite() && dense > MIN_SEGMENTS as f64 {
        dense as usize
    } else {
        MIN_SEGMENTS
    }
}

/// Lay out the visible arc for one frame.
///
/// The phase maps linearly onto the boundary (360 degrees is one lap) and fixes where the arc
/// starts. Segment `i` of `n` takes its color from ramp position `i / n * palette_len`, so the
/// arc sweeps through the whole palette once. Returns nothing for an empty boundary or a
/// non-positive visible share.
pub fn compute_segments(
    total_length: f64,
    visible_percent: f64,
    phase_degrees: f64,
    ramp: &ColorRamp,
) -> Vec<Segment> {
    if !total_length.is_finite()
        || total_length <= 0.0
        || !visible_percent.is_finite()
        || visible_percent <= 0.0
    {
        return Vec::new();
    }

    let visible_length = total_length * visible_percent / 100.0;
    let start_position = (phase_degrees / 360.0) * total_length;
    let count = segment_count(visible_length);
    let segment_length = visible_length / count as f64;
    let palette_len = ramp.len() as f64;

    let wrap = |pos: f64| {
        let p = pos.rem_euclid(total_length);
        // rem_euclid can round up to the modulus itself for tiny negative inputs.
        if p >= total_length { 0.0 } else { p }
    };

    (0..count)
        .map(|i| {
            let i_f = i as f64;
            let ramp_position = (i_f / count as f64) * palette_len;
            Segment {
                arc_start: wrap(start_position + i_f * segment_length),
                arc_end: wrap(start_position + (i_f + 1.0) * segment_length),
                color: ramp.color_at(ramp_position),
            }
        })
        .collect()
}
