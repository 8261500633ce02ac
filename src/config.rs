use std::sync::{Arc, RwLock};

use crate::{
    core::Rgb8,
    error::{GlowError, GlowResult},
};

/// Slider ranges offered by the settings screen. Hosts may use them for their own input
/// widgets; the engine never clamps to them.
pub mod ranges {
    use std::ops::RangeInclusive;

    pub const THICKNESS_PX: RangeInclusive<u32> = 5..=50;
    pub const SPEED: RangeInclusive<i32> = 1..=100;
    pub const VISIBLE_PERCENT: RangeInclusive<u32> = 10..=100;
    pub const CORNER_RADIUS_PX: RangeInclusive<u32> = 0..=50;
}

/// Everything the border engine needs to draw a frame.
///
/// Treated as an immutable value: hosts build a new one and swap it in through a
/// [`ConfigHandle`] instead of mutating fields while a frame may be reading them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    /// Stroke width in pixels.
    #[serde(alias = "thickness")]
    pub thickness_px: f64,
    /// Degrees advanced per 100 ticks.
    pub speed: i32,
    /// Share of the perimeter covered by the visible arc, in percent.
    #[serde(alias = "length")]
    pub visible_percent: f64,
    #[serde(alias = "corner")]
    pub corner_radius_px: f64,
    #[serde(alias = "colors")]
    pub palette: Vec<Rgb8>,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            thickness_px: 10.0,
            speed: 50,
            visible_percent: 100.0,
            corner_radius_px: 0.0,
            palette: default_palette(),
        }
    }
}

/// Red, green, yellow, blue-violet.
pub fn default_palette() -> Vec<Rgb8> {
    vec![
        Rgb8::new(0xFF, 0x00, 0x00),
        Rgb8::new(0x00, 0xFF, 0x00),
        Rgb8::new(0xFF, 0xFF, 0x00),
        Rgb8::new(0x8A, 0x2B, 0xE2),
    ]
}

impl BorderConfig {
    pub fn validate(&self) -> GlowResult<()> {
        if !self.thickness_px.is_finite() || self.thickness_px <= 0.0 {
            return Err(GlowError::validation("thickness_px must be finite and > 0"));
        }
        // <= 0 is a legal "draw nothing" value.
        if !self.visible_percent.is_finite() || self.visible_percent > 100.0 {
            return Err(GlowError::validation(
                "visible_percent must be finite and <= 100",
            ));
        }
        if !self.corner_radius_px.is_finite() || self.corner_radius_px < 0.0 {
            return Err(GlowError::validation(
                "corner_radius_px must be finite and >= 0",
            ));
        }
        if self.palette.is_empty() {
            return Err(GlowError::validation("palette must contain at least one color"));
        }
        Ok(())
    }

    /// Copy with the slider-driven parameters replaced. `palette: None` keeps the current colors.
    pub fn with_params(
        &self,
        thickness_px: f64,
        speed: i32,
        visible_percent: f64,
        corner_radius_px: f64,
        palette: Option<Vec<Rgb8>>,
    ) -> Self {
        Self {
            thickness_px,
            speed,
            visible_percent,
            corner_radius_px,
            palette: palette.unwrap_or_else(|| self.palette.clone()),
        }
    }
}

/// Shared slot holding the current configuration.
///
/// Writers replace the whole value; readers take an `Arc` snapshot that stays consistent for
/// the rest of their frame.
#[derive(Clone, Debug, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Arc<BorderConfig>>>,
}

impl ConfigHandle {
    pub fn new(config: BorderConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    pub fn snapshot(&self) -> Arc<BorderConfig> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Swap in `config`, returning the previous value.
    pub fn replace(&self, config: BorderConfig) -> Arc<BorderConfig> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, Arc::new(config))
    }
}

/// Where a render loop reloads its configuration from when it (re)starts.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> GlowResult<BorderConfig>;
}

impl<F> ConfigSource for F
where
    F: Fn() -> GlowResult<BorderConfig> + Send + Sync,
{
    fn load(&self) -> GlowResult<BorderConfig> {
        self()
    }
}

impl ConfigSource for BorderConfig {
    fn load(&self) -> GlowResult<BorderConfig> {
        Ok(self.clone())
    }
}

impl ConfigSource for ConfigHandle {
    fn load(&self) -> GlowResult<BorderConfig> {
        Ok(self.snapshot().as_ref().clone())
    }
}
