//! Camera distance animator: one scalar "altitude" value interpolated toward
//! a target over a fixed duration with a quartic ease-out. Starting a new
//! transition supersedes the one in flight; nothing is queued.

use crate::mode::ModeFlags;
use foundation::math::quart_out;

/// Scene-unit distances for the fixed mode table (sphere radius is 100).
pub const DIST_REVEAL_FAR: f64 = 1600.0;
pub const DIST_EXPLORE: f64 = 420.0;
pub const DIST_CINEMATIC: f64 = 260.0;

/// Transition durations, milliseconds. The initial reveal is the long one.
pub const DUR_REVEAL_MS: f64 = 3000.0;
pub const DUR_CINEMATIC_MS: f64 = 2500.0;
pub const DUR_EXPLORE_MS: f64 = 1200.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    pub distance: f64,
    pub target_distance: f64,
    pub anim_start_ms: f64,
    pub anim_duration_ms: f64,
    start_distance: f64,
    animating: bool,
}

#[derive(Debug, Clone)]
pub struct DistanceAnimator {
    pub state: CameraState,
}

impl DistanceAnimator {
    pub fn new(initial_distance: f64) -> Self {
        Self {
            state: CameraState {
                distance: initial_distance,
                target_distance: initial_distance,
                anim_start_ms: 0.0,
                anim_duration_ms: 0.0,
                start_distance: initial_distance,
                animating: false,
            },
        }
    }

    /// Initial distance for a given set of host mode flags: a reveal mounts
    /// far out and flies in, anything else mounts at its resting distance.
    pub fn initial_distance(flags: ModeFlags) -> f64 {
        if flags.revealing {
            DIST_REVEAL_FAR
        } else if flags.cinematic {
            DIST_CINEMATIC
        } else {
            DIST_EXPLORE
        }
    }

    /// Begin a transition toward `value` over `duration_ms`. Supersedes any
    /// in-flight transition. Re-invoking with the current target is a no-op,
    /// so hosts can call this every time their mode flags settle.
    pub fn set_target_distance(&mut self, value: f64, duration_ms: f64, now_ms: f64) {
        if value == self.state.target_distance {
            return;
        }
        self.state.start_distance = self.state.distance;
        self.state.target_distance = value;
        self.state.anim_start_ms = now_ms;
        self.state.anim_duration_ms = duration_ms.max(0.0);
        self.state.animating = true;
    }

    /// Re-aim the animator from the host's mode flags.
    pub fn apply_mode(&mut self, flags: ModeFlags, now_ms: f64) {
        let (distance, duration_ms) = if flags.cinematic {
            (DIST_CINEMATIC, DUR_CINEMATIC_MS)
        } else if flags.revealing {
            (DIST_EXPLORE, DUR_REVEAL_MS)
        } else {
            (DIST_EXPLORE, DUR_EXPLORE_MS)
        };
        self.set_target_distance(distance, duration_ms, now_ms);
    }

    /// Advance to wall-clock `now_ms`. Once the transition completes the
    /// distance lands exactly on the target and stops advancing.
    pub fn tick(&mut self, now_ms: f64) {
        if !self.state.animating {
            return;
        }

        let progress = if self.state.anim_duration_ms <= 0.0 {
            1.0
        } else {
            ((now_ms - self.state.anim_start_ms) / self.state.anim_duration_ms).clamp(0.0, 1.0)
        };

        if progress >= 1.0 {
            self.state.distance = self.state.target_distance;
            self.state.animating = false;
            return;
        }

        let eased = quart_out(progress);
        self.state.distance = self.state.start_distance
            + (self.state.target_distance - self.state.start_distance) * eased;
    }

    pub fn distance(&self) -> f64 {
        self.state.distance
    }

    pub fn is_animating(&self) -> bool {
        self.state.animating
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DIST_CINEMATIC, DIST_EXPLORE, DIST_REVEAL_FAR, DUR_CINEMATIC_MS, DUR_REVEAL_MS,
        DistanceAnimator,
    };
    use crate::mode::ModeFlags;

    #[test]
    fn reaches_target_exactly_at_duration() {
        let mut cam = DistanceAnimator::new(420.0);
        cam.set_target_distance(260.0, 2500.0, 1_000.0);
        cam.tick(1_000.0 + 2_500.0);
        assert_eq!(cam.distance(), 260.0);
        assert!(!cam.is_animating());
    }

    #[test]
    fn interpolation_is_monotonic() {
        let mut cam = DistanceAnimator::new(1600.0);
        cam.set_target_distance(420.0, 3000.0, 0.0);
        let mut prev = cam.distance();
        for step in 1..=60 {
            cam.tick(step as f64 * 50.0);
            assert!(cam.distance() <= prev, "zoom-in must never bounce back");
            prev = cam.distance();
        }
        assert_eq!(cam.distance(), 420.0);
    }

    #[test]
    fn past_duration_stops_advancing() {
        let mut cam = DistanceAnimator::new(420.0);
        cam.set_target_distance(260.0, 1000.0, 0.0);
        cam.tick(5_000.0);
        cam.tick(50_000.0);
        assert_eq!(cam.distance(), 260.0);
    }

    #[test]
    fn new_transition_supersedes_in_flight_one() {
        let mut cam = DistanceAnimator::new(420.0);
        cam.set_target_distance(260.0, 2000.0, 0.0);
        cam.tick(500.0);
        let mid = cam.distance();
        assert!(mid < 420.0 && mid > 260.0);

        // Retarget mid-flight; the new transition starts from `mid`.
        cam.set_target_distance(1600.0, 1000.0, 500.0);
        cam.tick(1_500.0);
        assert_eq!(cam.distance(), 1600.0);
    }

    #[test]
    fn unchanged_target_is_a_no_op() {
        let mut cam = DistanceAnimator::new(420.0);
        cam.set_target_distance(260.0, 2000.0, 0.0);
        cam.tick(1_000.0);
        let mid = cam.distance();

        // Re-sending the same target must not restart the clock.
        cam.set_target_distance(260.0, 2000.0, 1_000.0);
        cam.tick(2_000.0);
        assert_eq!(cam.distance(), 260.0);
        assert!(mid > 260.0);
    }

    #[test]
    fn zero_duration_lands_immediately() {
        let mut cam = DistanceAnimator::new(420.0);
        cam.set_target_distance(260.0, 0.0, 100.0);
        cam.tick(100.0);
        assert_eq!(cam.distance(), 260.0);
    }

    #[test]
    fn mode_table_maps_flags_to_distances() {
        let mut cam = DistanceAnimator::new(DIST_REVEAL_FAR);

        let reveal = ModeFlags {
            cinematic: false,
            revealing: true,
        };
        cam.apply_mode(reveal, 0.0);
        assert_eq!(cam.state.target_distance, DIST_EXPLORE);
        assert_eq!(cam.state.anim_duration_ms, DUR_REVEAL_MS);

        let cinematic = ModeFlags {
            cinematic: true,
            revealing: false,
        };
        cam.apply_mode(cinematic, 10.0);
        assert_eq!(cam.state.target_distance, DIST_CINEMATIC);
        assert_eq!(cam.state.anim_duration_ms, DUR_CINEMATIC_MS);
    }

    #[test]
    fn initial_distance_depends_on_flags() {
        assert_eq!(
            DistanceAnimator::initial_distance(ModeFlags {
                cinematic: false,
                revealing: true
            }),
            DIST_REVEAL_FAR
        );
        assert_eq!(
            DistanceAnimator::initial_distance(ModeFlags::default()),
            DIST_EXPLORE
        );
    }
}
