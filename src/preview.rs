use std::time::Duration;

use crate::{
    clock::AnimationClock,
    config::BorderConfig,
    core::{Rgb8, SurfaceSize},
    error::GlowResult,
    render::{DrawTarget, FrameStats, render_frame},
};

/// Interval at which hosts should call [`PreviewAnimator::on_frame_tick`].
pub const PREVIEW_TICK: Duration = Duration::from_millis(16);

/// Border state for an interactive preview widget.
///
/// The host owns the widget and its timer: it calls `attach`/`detach` from its lifecycle hooks,
/// `on_frame_tick` from the timer, and `draw` whenever it repaints.
#[derive(Clone, Debug, Default)]
pub struct PreviewAnimator {
    config: BorderConfig,
    clock: AnimationClock,
    animating: bool,
}

impl PreviewAnimator {
    pub fn new(config: BorderConfig) -> Self {
        Self {
            config,
            clock: AnimationClock::new(),
            animating: false,
        }
    }

    pub fn attach(&mut self) {
        self.animating = true;
    }

    pub fn detach(&mut self) {
        self.animating = false;
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn config(&self) -> &BorderConfig {
        &self.config
    }

    pub fn phase(&self) -> f64 {
        self.clock.phase()
    }

    /// Advance one tick. Returns `true` when the widget should repaint.
    pub fn on_frame_tick(&mut self) -> bool {
        if !self.animating {
            return false;
        }
        self.clock.advance(1, self.config.speed);
        true
    }

    /// Apply slider values; `palette: None` keeps the current colors.
    ///
    /// Always returns `true`: the widget repaints after every change, animating or not.
    pub fn update_border(
        &mut self,
        thickness_px: f64,
        speed: i32,
        visible_percent: f64,
        corner_radius_px: f64,
        palette: Option<Vec<Rgb8>>,
    ) -> bool {
        self.config = self.config.with_params(
            thickness_px,
            speed,
            visible_percent,
            corner_radius_px,
            palette,
        );
        true
    }

    /// Replace the whole config. Returns `true` like [`update_border`](Self::update_border).
    pub fn set_config(&mut self, config: BorderConfig) -> bool {
        self.config = config;
        true
    }

    /// Paint the current frame. The target is not cleared, so the widget background shows
    /// through.
    pub fn draw<T: DrawTarget + ?Sized>(
        &self,
        size: SurfaceSize,
        target: &mut T,
    ) -> GlowResult<FrameStats> {
        render_frame(&self.config, self.clock.phase(), size, target)
    }
}
