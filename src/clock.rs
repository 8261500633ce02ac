/// Degrees in one full lap of the border.
pub const FULL_TURN_DEGREES: f64 = 360.0;

/// Animation phase in degrees, always in `[0, 360)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationClock {
    progress_degrees: f64,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at `degrees`, normalized into `[0, 360)`.
    pub fn at(degrees: f64) -> Self {
        let progress_degrees = if degrees.is_finite() {
            let d = degrees.rem_euclid(FULL_TURN_DEGREES);
            if d >= FULL_TURN_DEGREES { 0.0 } else { d }
        } else {
            0.0
        };
        Self { progress_degrees }
    }

    pub fn phase(&self) -> f64 {
        self.progress_degrees
    }

    /// Advance by `speed / 100` degrees per tick.
    ///
    /// Reaching 360 resets the phase to exactly 0; whatever overshoots the lap is dropped
    /// rather than carried into the next one.
    pub fn advance(&mut self, delta_ticks: u32, speed: i32) -> f64 {
        self.progress_degrees = tick_by(self.progress_degrees, delta_ticks, speed);
        self.progress_degrees
    }
}

/// One tick of [`AnimationClock::advance`] on a bare phase value.
pub fn tick(phase_degrees: f64, speed: i32) -> f64 {
    tick_by(phase_degrees, 1, speed)
}

fn tick_by(phase_degrees: f64, delta_ticks: u32, speed: i32) -> f64 {
    let mut p = phase_degrees + (f64::from(speed) / 100.0) * f64::from(delta_ticks);
    if p >= FULL_TURN_DEGREES {
        p = 0.0;
    }
    // Negative speeds run backwards and wrap once below zero.
    if p < 0.0 {
        p += FULL_TURN_DEGREES;
        if !(0.0..FULL_TURN_DEGREES).contains(&p) {
            p = 0.0;
        }
    }
    if p.is_nan() { 0.0 } else { p }
}
