use kurbo::Cap;

use crate::{
    config::BorderConfig,
    core::{BezPath, Rgb8, SurfaceSize},
    error::{GlowError, GlowResult},
    geometry::{boundary_path, inset_bounds},
    ramp::ColorRamp,
    sampler::{PathSampler, join_fragments},
    segmenter::compute_segments,
};

/// How a border segment is stroked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: Cap,
}

impl StrokeStyle {
    pub fn round(width: f64) -> Self {
        Self {
            width,
            cap: Cap::Round,
        }
    }
}

/// Drawing capability supplied by the host for one frame.
pub trait DrawTarget {
    /// Fill the whole target with `color`.
    fn clear(&mut self, color: Rgb8);

    fn stroke_path(
        &mut self,
        path: &BezPath,
        style: &StrokeStyle,
        color: Rgb8,
    ) -> GlowResult<()>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb8),
    Stroke {
        path: BezPath,
        style: StrokeStyle,
        color: Rgb8,
    },
}

/// Target that records draw calls instead of rasterizing them.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> impl Iterator<Item = (&BezPath, &StrokeStyle, Rgb8)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Stroke { path, style, color } => Some((path, style, *color)),
            DrawCommand::Clear(_) => None,
        })
    }
}

impl DrawTarget for DrawList {
    fn clear(&mut self, color: Rgb8) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn stroke_path(
        &mut self,
        path: &BezPath,
        style: &StrokeStyle,
        color: Rgb8,
    ) -> GlowResult<()> {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            style: *style,
            color,
        });
        Ok(())
    }
}

/// What a single [`render_frame`] call drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct FrameStats {
    pub total_length: f64,
    pub segment_count: usize,
    pub fragment_count: usize,
}

/// Draw one frame of the border onto `target`.
///
/// The boundary is inset by half the stroke width so the stroke stays on the surface. Each
/// segment is stroked once; segments crossing the path's start point are stroked as one path
/// with two pieces. The target is not cleared.
#[tracing::instrument(level = "trace", skip(config, target))]
pub fn render_frame<T: DrawTarget + ?Sized>(
    config: &BorderConfig,
    phase_degrees: f64,
    size: SurfaceSize,
    target: &mut T,
) -> GlowResult<FrameStats> {
    if !config.thickness_px.is_finite() || config.thickness_px <= 0.0 {
        return Err(GlowError::validation("thickness_px must be finite and > 0"));
    }
    let ramp = ColorRamp::from_slice(&config.palette)?;

    let rect = inset_bounds(size.bounds(), config.thickness_px);
    let boundary = boundary_path(rect, config.corner_radius_px);
    let sampler = PathSampler::new(&boundary);
    let total_length = sampler.total_length();

    let segments = compute_segments(
        total_length,
        config.visible_percent,
        phase_degrees,
        &ramp,
    );

    let style = StrokeStyle::round(config.thickness_px);
    let mut stats = FrameStats {
        total_length,
        segment_count: segments.len(),
        fragment_count: 0,
    };
    for seg in &segments {
        let fragments = sampler.extract_range(seg.arc_start, seg.arc_end);
        if fragments.is_empty() {
            continue;
        }
        stats.fragment_count += fragments.len();
        target.stroke_path(&join_fragments(&fragments), &style, seg.color)?;
    }
    Ok(stats)
}
