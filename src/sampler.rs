use kurbo::{ParamCurve, ParamCurveArclen, PathSeg};
use smallvec::SmallVec;

use crate::core::BezPath;

/// Accuracy used for arc-length measurement and inversion, in path units.
const ARCLEN_ACCURACY: f64 = 1e-3;

/// A drawable piece of the boundary covering arc length `[start, end]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PathFragment {
    pub start: f64,
    pub end: f64,
    pub path: BezPath,
}

#[derive(Clone, Debug)]
struct MeasuredSeg {
    seg: PathSeg,
    /// Arc length from the path start to the beginning of this segment.
    offset: f64,
    len: f64,
}

/// Arc-length view over a closed boundary path.
#[derive(Clone, Debug)]
pub struct PathSampler {
    segs: Vec<MeasuredSeg>,
    total: f64,
}

impl PathSampler {
    pub fn new(path: &BezPath) -> Self {
        let mut segs = Vec::new();
        let mut total = 0.0;
        for seg in path.segments() {
            let len = seg.arclen(ARCLEN_ACCURACY);
            // Zero-length pieces (collapsed edges, NaN) carry no arc length.
            if len.is_nan() || len <= 0.0 {
                continue;
            }
            segs.push(MeasuredSeg {
                seg,
                offset: total,
                len,
            });
            total += len;
        }
        Self { segs, total }
    }

    /// Measured perimeter; `0.0` for degenerate paths.
    pub fn total_length(&self) -> f64 {
        self.total
    }

    /// Pieces of the boundary covering `[start, end]`.
    ///
    /// `start < end` yields one fragment. Otherwise the range is taken to cross the path's
    /// start point and yields `[start, total]` followed by `[0, end]`. Bounds are clamped to the
    /// path and empty pieces are dropped, so a degenerate path yields nothing.
    pub fn extract_range(&self, start: f64, end: f64) -> SmallVec<[PathFragment; 2]> {
        let mut out = SmallVec::new();
        if self.total <= 0.0 || !start.is_finite() || !end.is_finite() {
            return out;
        }

        if start < end {
            self.push_fragment(&mut out, start, end);
        } else {
            self.push_fragment(&mut out, start, self.total);
            self.push_fragment(&mut out, 0.0, end);
        }
        out
    }

    /// The fragments of [`extract_range`](Self::extract_range) joined into one path, one
    /// sub-path per fragment, so a wrapping range strokes with a single draw call.
    pub fn segment_path(&self, start: f64, end: f64) -> BezPath {
        join_fragments(&self.extract_range(start, end))
    }

    fn push_fragment(&self, out: &mut SmallVec<[PathFragment; 2]>, start: f64, end: f64) {
        let start = start.clamp(0.0, self.total);
        let end = end.clamp(0.0, self.total);
        if end <= start {
            return;
        }
        out.push(PathFragment {
            start,
            end,
            path: self.sub_path(start, end),
        });
    }

    fn sub_path(&self, start: f64, end: f64) -> BezPath {
        let mut path = BezPath::new();
        for m in &self.segs {
            let seg_end = m.offset + m.len;
            if seg_end <= start {
                continue;
            }
            if m.offset >= end {
                break;
            }

            let t0 = if start > m.offset {
                m.seg.inv_arclen(start - m.offset, ARCLEN_ACCURACY)
            } else {
                0.0
            };
            let t1 = if end < seg_end {
                m.seg.inv_arclen(end - m.offset, ARCLEN_ACCURACY)
            } else {
                1.0
            };
            if t1 <= t0 {
                continue;
            }

            let piece = m.seg.subsegment(t0..t1);
            if path.elements().is_empty() {
                path.move_to(piece.start());
            }
            path.push(piece.as_path_el());
        }
        path
    }
}

/// Concatenate fragments into one path, keeping each as its own sub-path.
pub fn join_fragments(fragments: &[PathFragment]) -> BezPath {
    let mut path = BezPath::new();
    for frag in fragments {
        path.extend(frag.path.elements().iter().copied());
    }
    path
}
