//! Tilt-driven rotation of the liquid surface
//!
//! Accelerometer samples set a target angle (0° = upright, growing clockwise
//! through 360°). Each tick the displayed angle closes a tenth of the gap,
//! going the short way round when the gap crosses 0/360.

use super::state::{ScrollDirection, TiltSample};
use crate::consts::{
    ROTATE_PERIOD_MS, ROTATE_TICKS, SPLASH_GAIN, SPLASH_MAX_AMPLITUDE, SPLASH_MIN_DELTA_DEG,
    TILT_DEAD_ZONE, WRAP_THRESHOLD_DEG,
};
use crate::normalize_degrees;

/// Result of offering a sample to the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TiltOutcome {
    /// Level still animating (or empty); rotation is frozen
    NotSettled,
    /// NaN, infinite or zero-length reading
    Malformed,
    /// Device close enough to level on both axes
    DeadZone,
    /// Too soon after the last processed sample
    RateLimited,
    Applied {
        direction: ScrollDirection,
        target_angle: f32,
        /// Amplitude to kick the wave to, before capping at the maximum
        splash: Option<f32>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct TiltRotationController {
    /// Degrees; may sit above 360 while a wrap is being smoothed
    target_angle: f32,
    /// Degrees, smoothed toward the target
    current_angle: f32,
    /// Timestamp of the last processed sample
    last_sample_ms: Option<u64>,
}

impl TiltRotationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a sample. `amplitude` is the wave's current height, used to
    /// decide whether a sharp tilt should splash.
    pub fn on_sample(&mut self, sample: TiltSample, settled: bool, amplitude: f32) -> TiltOutcome {
        if !settled {
            return TiltOutcome::NotSettled;
        }
        if sample.is_malformed() {
            log::debug!("Discarding malformed tilt sample {sample:?}");
            return TiltOutcome::Malformed;
        }
        if sample.x.abs() < TILT_DEAD_ZONE && sample.y.abs() < TILT_DEAD_ZONE {
            return TiltOutcome::DeadZone;
        }
        if let Some(last) = self.last_sample_ms {
            if sample.time_ms.saturating_sub(last) <= ROTATE_PERIOD_MS {
                return TiltOutcome::RateLimited;
            }
        }

        let direction = if sample.x > 0.0 {
            ScrollDirection::Forward
        } else {
            ScrollDirection::Reverse
        };

        let angle = tilt_angle(sample.x, sample.y);
        self.last_sample_ms = Some(sample.time_ms);

        let delta = (normalize_degrees(angle) - normalize_degrees(self.target_angle)).abs();
        let splash = (amplitude < SPLASH_MAX_AMPLITUDE && delta > SPLASH_MIN_DELTA_DEG)
            .then_some(delta * SPLASH_GAIN);

        self.target_angle = angle;

        TiltOutcome::Applied {
            direction,
            target_angle: angle,
            splash,
        }
    }

    /// Smooth the current angle one step toward the target
    pub fn tick(&mut self) {
        if (self.target_angle - self.current_angle).abs() > WRAP_THRESHOLD_DEG {
            if self.target_angle > self.current_angle {
                self.current_angle += 360.0;
            } else {
                self.target_angle += 360.0;
            }
        }

        self.current_angle += (self.target_angle - self.current_angle) / ROTATE_TICKS;

        if self.current_angle >= 360.0 {
            self.current_angle -= 360.0;
            if self.target_angle >= 360.0 {
                self.target_angle -= 360.0;
            }
        }
    }

    /// Back to upright; the displayed angle eases there once ticks resume
    pub fn reset_target(&mut self) {
        self.target_angle = 0.0;
    }

    pub fn target_angle(&self) -> f32 {
        self.target_angle
    }

    /// Displayed angle in [0, 360)
    pub fn current_angle(&self) -> f32 {
        normalize_degrees(self.current_angle)
    }

    #[cfg(test)]
    fn set_angles(&mut self, current: f32, target: f32) {
        self.current_angle = current;
        self.target_angle = target;
    }
}

/// Angle of the (x, y) gravity vector from the +y axis, in [0, 360)
pub fn tilt_angle(x: f32, y: f32) -> f32 {
    let g = ((x * x + y * y) as f64).sqrt();
    let cos = (y as f64 / g).clamp(-1.0, 1.0);
    let mut rad = cos.acos();
    if x < 0.0 {
        rad = std::f64::consts::TAU - rad;
    }
    normalize_degrees(rad.to_degrees() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn applied(outcome: TiltOutcome) -> (ScrollDirection, f32, Option<f32>) {
        match outcome {
            TiltOutcome::Applied {
                direction,
                target_angle,
                splash,
            } => (direction, target_angle, splash),
            other => panic!("expected Applied, got {other:?}"),
        }
    }

    /// Shortest signed distance from `a` to `b` in degrees
    fn arc_distance(a: f32, b: f32) -> f32 {
        let d = normalize_degrees(b - a);
        if d > 180.0 { d - 360.0 } else { d }
    }

    #[test]
    fn test_tilt_angle_quadrants() {
        assert!((tilt_angle(0.0, 9.8) - 0.0).abs() < 1e-3);
        assert!((tilt_angle(5.0, 0.0) - 90.0).abs() < 1e-3);
        assert!((tilt_angle(0.0, -9.8) - 180.0).abs() < 1e-3);
        assert!((tilt_angle(-5.0, 0.0) - 270.0).abs() < 1e-3);
        assert!((tilt_angle(4.0, 4.0) - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_sharp_tilt_splashes() {
        let mut tilt = TiltRotationController::new();
        let (direction, angle, splash) =
            applied(tilt.on_sample(TiltSample::new(5.0, 0.0, 0), true, 0.0));
        assert_eq!(direction, ScrollDirection::Forward);
        assert!((angle - 90.0).abs() < 1e-3);
        // 90° * 20, capped by the wave field
        assert!((splash.unwrap() - 1800.0).abs() < 0.1);
        assert!((tilt.target_angle() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_splash_on_rough_water() {
        let mut tilt = TiltRotationController::new();
        let (_, _, splash) = applied(tilt.on_sample(TiltSample::new(5.0, 0.0, 0), true, 5.0));
        assert_eq!(splash, None);
    }

    #[test]
    fn test_gating() {
        let mut tilt = TiltRotationController::new();
        assert_eq!(
            tilt.on_sample(TiltSample::new(5.0, 0.0, 0), false, 0.0),
            TiltOutcome::NotSettled
        );
        assert_eq!(
            tilt.on_sample(TiltSample::new(2.9, -2.9, 0), true, 0.0),
            TiltOutcome::DeadZone
        );
        assert_eq!(
            tilt.on_sample(TiltSample::new(f32::NAN, 5.0, 0), true, 0.0),
            TiltOutcome::Malformed
        );
        assert_eq!(tilt.target_angle(), 0.0);

        applied(tilt.on_sample(TiltSample::new(-5.0, 0.0, 1_000), true, 0.0));
        assert_eq!(
            tilt.on_sample(TiltSample::new(5.0, 0.0, 1_300), true, 0.0),
            TiltOutcome::RateLimited
        );
        let (direction, _, _) = applied(tilt.on_sample(TiltSample::new(5.0, 0.0, 1_301), true, 0.0));
        assert_eq!(direction, ScrollDirection::Forward);
    }

    #[test]
    fn test_left_tilt_reverses() {
        let mut tilt = TiltRotationController::new();
        let (direction, angle, _) =
            applied(tilt.on_sample(TiltSample::new(-5.0, 0.0, 0), true, 0.0));
        assert_eq!(direction, ScrollDirection::Reverse);
        assert!((angle - 270.0).abs() < 1e-3);
    }

    #[test]
    fn test_smoothing_steps_a_tenth() {
        let mut tilt = TiltRotationController::new();
        tilt.set_angles(0.0, 90.0);
        tilt.tick();
        assert!((tilt.current_angle() - 9.0).abs() < 1e-4);
        tilt.tick();
        assert!((tilt.current_angle() - 17.1).abs() < 1e-4);
    }

    #[test]
    fn test_wrap_takes_short_path_upward() {
        let mut tilt = TiltRotationController::new();
        tilt.set_angles(350.0, 10.0);
        for _ in 0..100 {
            tilt.tick();
            let a = tilt.current_angle();
            assert!(a >= 350.0 - 1e-3 || a <= 10.0 + 1e-3, "went the long way: {a}");
        }
        assert!(arc_distance(tilt.current_angle(), 10.0).abs() < 0.01);
    }

    #[test]
    fn test_wrap_takes_short_path_downward() {
        let mut tilt = TiltRotationController::new();
        tilt.set_angles(10.0, 350.0);
        for _ in 0..100 {
            tilt.tick();
            let a = tilt.current_angle();
            assert!(a >= 350.0 - 1e-3 || a <= 10.0 + 1e-3, "went the long way: {a}");
        }
        assert!(arc_distance(tilt.current_angle(), 350.0).abs() < 0.01);
    }

    #[test]
    fn test_reset_target() {
        let mut tilt = TiltRotationController::new();
        applied(tilt.on_sample(TiltSample::new(5.0, 0.0, 0), true, 0.0));
        tilt.reset_target();
        assert_eq!(tilt.target_angle(), 0.0);
    }

    proptest! {
        #[test]
        fn step_never_exceeds_a_tenth_of_the_gap(
            current in 0.0f32..360.0,
            target in 0.0f32..360.0,
        ) {
            let mut tilt = TiltRotationController::new();
            tilt.set_angles(current, target);
            // Gaps up to the wrap threshold are closed directly, larger ones the other way
            let raw = (target - current).abs();
            let gap = if raw > WRAP_THRESHOLD_DEG { 360.0 - raw } else { raw };
            tilt.tick();
            let moved = arc_distance(current, tilt.current_angle()).abs();
            prop_assert!(moved <= gap / 10.0 + 1e-3);
            prop_assert!((0.0..360.0).contains(&tilt.current_angle()));
        }

        #[test]
        fn angle_is_in_range(x in -20.0f32..20.0, y in -20.0f32..20.0) {
            prop_assume!(x.abs() > 1e-3 || y.abs() > 1e-3);
            let a = tilt_angle(x, y);
            prop_assert!((0.0..360.0).contains(&a));
        }
    }
}
