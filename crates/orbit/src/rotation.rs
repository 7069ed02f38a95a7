//! Geo-rotation model: maps (lon, lat) targets to rotation angles and
//! integrates rotation state over time.
//!
//! Conventions: `x` is the polar tilt (latitude axis), `y` the azimuthal spin
//! (longitude axis), both in radians. The displayed rotation chases the target
//! by exponential smoothing, so motion eases out without ever overshooting.

use foundation::math::{Vec2, decay_factor, rate_from_step_factor, smoothing_alpha};
use foundation::time::REF_DT_S;

/// Offset added to the target longitude so the surface texture's prime
/// meridian faces the camera when a place is framed. A different surface map
/// projection must revisit this constant.
pub const LON_FACING_OFFSET_DEG: f64 = 90.0;

/// Polar tilt guard: keeps the view away from the poles so the globe can
/// never flip over the top.
pub const POLE_LIMIT_RAD: f64 = std::f64::consts::PI / 2.2;

/// Idle eastward drift, radians per second (≈ 0.05°/frame at 60 Hz).
pub const DRIFT_RAD_PER_S: f64 = 0.054;

/// Fraction of the remaining distance covered per reference step.
pub const SMOOTHING_PER_STEP: f64 = 0.1;

/// Inertia multiplier per reference step.
pub const INERTIA_DECAY_PER_STEP: f64 = 0.95;

/// Shared rotation state read by the render loop and the telemetry readout.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct RotationState {
    /// Smoothed display rotation.
    pub current: Vec2,
    /// Desired rotation the display value chases.
    pub target: Vec2,
    /// Residual drag velocity, radians per reference step.
    pub inertia: Vec2,
}

#[derive(Debug, Default, Clone)]
pub struct RotationModel {
    pub state: RotationState,
}

impl RotationModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the globe at a (longitude, latitude) pair in degrees.
    pub fn set_target(&mut self, lon_deg: f64, lat_deg: f64) {
        self.state.target.y = (lon_deg + LON_FACING_OFFSET_DEG).to_radians();
        self.state.target.x = lat_deg
            .to_radians()
            .clamp(-POLE_LIMIT_RAD, POLE_LIMIT_RAD);
    }

    /// Advance the model by `dt_s` seconds. `drift` enables the slow idle
    /// auto-rotation; callers disable it while dragging, while a manual
    /// override is pending, and while a target is being followed.
    pub fn tick(&mut self, dt_s: f64, drift: bool) {
        let dt_s = dt_s.clamp(0.0, 0.1);

        if drift {
            self.state.target.y += DRIFT_RAD_PER_S * dt_s;
        }

        let decay_rate = rate_from_step_factor(INERTIA_DECAY_PER_STEP, REF_DT_S);
        self.state.inertia = self.state.inertia.scale(decay_factor(decay_rate, dt_s));
        self.state.target = self.state.target + self.state.inertia.scale(dt_s / REF_DT_S);

        self.state.target.x = self.state.target.x.clamp(-POLE_LIMIT_RAD, POLE_LIMIT_RAD);

        let smooth_rate = rate_from_step_factor(1.0 - SMOOTHING_PER_STEP, REF_DT_S);
        let alpha = smoothing_alpha(smooth_rate, dt_s);
        let gap = self.state.target - self.state.current;
        self.state.current = self.state.current + gap.scale(alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DRIFT_RAD_PER_S, INERTIA_DECAY_PER_STEP, LON_FACING_OFFSET_DEG, POLE_LIMIT_RAD,
        RotationModel,
    };
    use foundation::math::Vec2;
    use foundation::time::REF_DT_S;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn set_target_applies_facing_offset() {
        let mut rot = RotationModel::new();
        rot.set_target(36.8, -1.3);
        assert_close(
            rot.state.target.y,
            (36.8 + LON_FACING_OFFSET_DEG).to_radians(),
            1e-12,
        );
        assert_close(rot.state.target.x, (-1.3f64).to_radians(), 1e-12);
    }

    #[test]
    fn idle_drift_strictly_increases_longitude() {
        let mut rot = RotationModel::new();
        let mut prev = rot.state.target.y;
        for _ in 0..500 {
            rot.tick(REF_DT_S, true);
            assert!(rot.state.target.y > prev);
            prev = rot.state.target.y;
        }
    }

    #[test]
    fn drift_rate_matches_reference_step() {
        let mut rot = RotationModel::new();
        rot.tick(REF_DT_S, true);
        assert_close(rot.state.target.y, DRIFT_RAD_PER_S * REF_DT_S, 1e-12);
    }

    #[test]
    fn current_converges_to_target() {
        let mut rot = RotationModel::new();
        rot.set_target(36.8, -1.3);
        for _ in 0..200 {
            rot.tick(REF_DT_S, false);
        }
        assert_close(rot.state.current.y, rot.state.target.y, 0.01);
        assert_close(rot.state.current.x, rot.state.target.x, 0.01);
    }

    #[test]
    fn smoothing_never_overshoots() {
        let mut rot = RotationModel::new();
        rot.set_target(120.0, 40.0);
        let mut prev_gap = (rot.state.target.y - rot.state.current.y).abs();
        for _ in 0..400 {
            rot.tick(REF_DT_S, false);
            let gap = (rot.state.target.y - rot.state.current.y).abs();
            assert!(gap <= prev_gap);
            prev_gap = gap;
        }
    }

    #[test]
    fn pole_guard_holds_under_adversarial_input() {
        let mut rot = RotationModel::new();
        // Slam the tilt target way past the guard every tick.
        for _ in 0..300 {
            rot.state.target.x += 1.0;
            rot.tick(REF_DT_S, false);
            assert!(rot.state.target.x <= POLE_LIMIT_RAD);
            assert!(rot.state.current.x.abs() <= POLE_LIMIT_RAD);
        }
        for _ in 0..300 {
            rot.state.target.x -= 1.0;
            rot.tick(REF_DT_S, false);
            assert!(rot.state.target.x >= -POLE_LIMIT_RAD);
            assert!(rot.state.current.x.abs() <= POLE_LIMIT_RAD);
        }
    }

    #[test]
    fn inertia_decays_geometrically_and_moves_target() {
        let mut rot = RotationModel::new();
        rot.state.inertia = Vec2::new(0.0, 0.02);
        let before = rot.state.target.y;
        rot.tick(REF_DT_S, false);
        // Inertia decays by the per-step factor, then advances the target.
        assert_close(rot.state.inertia.y, 0.02 * INERTIA_DECAY_PER_STEP, 1e-9);
        assert!(rot.state.target.y > before);

        let mut magnitude = rot.state.inertia.y;
        let mut ticks = 0;
        while magnitude > 0.02 * 0.01 {
            rot.tick(REF_DT_S, false);
            assert!(rot.state.inertia.y < magnitude);
            magnitude = rot.state.inertia.y;
            ticks += 1;
            assert!(ticks < 120, "inertia must die off within a bounded window");
        }
        // 0.95^n < 0.01 needs n ≈ 90.
        assert!(ticks >= 80);
    }

    #[test]
    fn half_rate_ticks_integrate_like_reference_ticks() {
        // Two 120 Hz steps should land close to one 60 Hz step.
        let mut a = RotationModel::new();
        let mut b = RotationModel::new();
        a.set_target(10.0, 5.0);
        b.set_target(10.0, 5.0);
        a.tick(REF_DT_S, false);
        b.tick(REF_DT_S / 2.0, false);
        b.tick(REF_DT_S / 2.0, false);
        assert_close(a.state.current.y, b.state.current.y, 1e-9);
    }
}
