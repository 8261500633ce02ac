use crate::{
    core::Rgb8,
    error::{GlowError, GlowResult},
};

/// Ordered palette sampled with linear interpolation between neighbors.
///
/// Ramp positions run over `[0, len)`; position `len` wraps back to the first color, so the
/// last entry blends into the first.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorRamp {
    colors: Vec<Rgb8>,
}

impl ColorRamp {
    /// Rejects an empty palette.
    pub fn new(colors: Vec<Rgb8>) -> GlowResult<Self> {
        if colors.is_empty() {
            return Err(GlowError::validation(
                "color ramp needs at least one color",
            ));
        }
        Ok(Self { colors })
    }

    pub fn from_slice(colors: &[Rgb8]) -> GlowResult<Self> {
        Self::new(colors.to_vec())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb8] {
        &self.colors
    }

    pub fn color_at(&self, ramp_position: f64) -> Rgb8 {
        let len = self.colors.len();
        if len == 1 || !ramp_position.is_finite() {
            return self.colors[0];
        }

        let floor = ramp_position.floor();
        let index = (floor as i64).rem_euclid(len as i64) as usize;
        let next = (index + 1) % len;
        let fraction = (ramp_position - floor).clamp(0.0, 1.0);

        lerp_rgb(self.colors[index], self.colors[next], fraction)
    }
}

/// Per-channel lerp, truncating toward zero.
fn lerp_rgb(a: Rgb8, b: Rgb8, t: f64) -> Rgb8 {
    fn channel(a: u8, b: u8, t: f64) -> u8 {
        let a = f64::from(a);
        let b = f64::from(b);
        (a + (b - a) * t).trunc().clamp(0.0, 255.0) as u8
    }

    Rgb8 {
        r: channel(a.r, b.r, t),
        g: channel(a.g, b.g, t),
        b: channel(a.b, b.b, t),
    }
}
