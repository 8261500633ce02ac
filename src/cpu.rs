use crate::{
    core::{BezPath, Point, Rgb8},
    error::{GlowError, GlowResult},
    render::{DrawTarget, StrokeStyle},
};

/// [`DrawTarget`] rasterizing through `vello_cpu`.
///
/// Draw calls are recorded into a fresh render context; [`finish_into`](Self::finish_into)
/// rasterizes them into a pixmap.
pub struct CpuCanvas {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
}

impl CpuCanvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Rasterize everything drawn so far into `pixmap`, replacing its contents.
    pub fn finish_into(&mut self, pixmap: &mut vello_cpu::Pixmap) -> GlowResult<()> {
        if pixmap.width() != self.width || pixmap.height() != self.height {
            return Err(GlowError::render(format!(
                "pixmap is {}x{}, canvas is {}x{}",
                pixmap.width(),
                pixmap.height(),
                self.width,
                self.height
            )));
        }
        clear_pixmap(pixmap, [0, 0, 0, 0]);
        self.ctx.flush();
        self.ctx.render_to_pixmap(pixmap);
        Ok(())
    }
}

impl DrawTarget for CpuCanvas {
    fn clear(&mut self, color: Rgb8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }

    fn stroke_path(
        &mut self,
        path: &BezPath,
        style: &StrokeStyle,
        color: Rgb8,
    ) -> GlowResult<()> {
        if !style.width.is_finite() || style.width <= 0.0 {
            return Err(GlowError::render(format!(
                "invalid stroke width {}",
                style.width
            )));
        }
        if path.elements().is_empty() {
            return Ok(());
        }

        let stroke = vello_cpu::kurbo::Stroke::new(style.width).with_caps(cap_to_cpu(style.cap));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_stroke(stroke);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.stroke_path(&bezpath_to_cpu(path));
        Ok(())
    }
}

pub(crate) fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn color_to_cpu(c: Rgb8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, 255)
}

fn cap_to_cpu(cap: kurbo::Cap) -> vello_cpu::kurbo::Cap {
    match cap {
        kurbo::Cap::Butt => vello_cpu::kurbo::Cap::Butt,
        kurbo::Cap::Square => vello_cpu::kurbo::Cap::Square,
        kurbo::Cap::Round => vello_cpu::kurbo::Cap::Round,
    }
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
