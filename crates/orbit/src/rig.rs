//! Single owner of the interactive globe state.
//!
//! The render loop holds one `OrbitRig`, forwards pointer events and host
//! flags into it, and calls [`OrbitRig::advance`] once per frame. All state
//! lives here; the pointer handlers and the frame loop are the only writers
//! and run on the same logical thread. Porting to a platform with threaded
//! input delivery requires marshalling pointer events onto the frame thread.

use crate::camera::DistanceAnimator;
use crate::mode::{InteractionMode, ModeFlags};
use crate::pointer::PointerController;
use crate::rotation::{RotationModel, RotationState};
use crate::telemetry::{self, Telemetry};

#[derive(Debug, Clone)]
pub struct OrbitRig {
    rotation: RotationModel,
    camera: DistanceAnimator,
    pointer: PointerController,
    flags: ModeFlags,
    interaction: InteractionMode,
    has_target: bool,
    telemetry: Telemetry,
    alive: bool,
}

impl OrbitRig {
    pub fn new(flags: ModeFlags, now_ms: f64) -> Self {
        let mut camera = DistanceAnimator::new(DistanceAnimator::initial_distance(flags));
        camera.apply_mode(flags, now_ms);
        Self {
            rotation: RotationModel::new(),
            camera,
            pointer: PointerController::new(),
            flags,
            interaction: InteractionMode::default(),
            has_target: false,
            telemetry: Telemetry::default(),
            alive: true,
        }
    }

    /// Host phase flags changed; re-aim the camera. Idempotent.
    pub fn set_mode_flags(&mut self, flags: ModeFlags, now_ms: f64) {
        if !self.alive {
            return;
        }
        self.flags = flags;
        self.camera.apply_mode(flags, now_ms);
    }

    /// Host supplies a travel destination in degrees.
    ///
    /// Dropped outright while the user is dragging: drag always wins, nothing
    /// is queued, and the host must resend once it wants the travel to happen.
    pub fn set_target_coordinates(&mut self, lon_deg: f64, lat_deg: f64) {
        if !self.alive || self.pointer.is_dragging() {
            return;
        }
        self.rotation.set_target(lon_deg, lat_deg);
        self.pointer.clear_override();
        self.interaction = InteractionMode::CinematicLocked;
        self.has_target = true;
    }

    /// Host withdraws the destination; the globe holds, then drifts.
    pub fn clear_target(&mut self) {
        if !self.alive {
            return;
        }
        self.has_target = false;
        if self.interaction == InteractionMode::CinematicLocked {
            self.interaction = InteractionMode::AutoDrift;
        }
    }

    pub fn pointer_down(&mut self, x_px: f64, y_px: f64) {
        if !self.alive {
            return;
        }
        self.pointer.on_pointer_down(x_px, y_px, &mut self.rotation);
        self.interaction = InteractionMode::ManualOverride;
    }

    pub fn pointer_move(&mut self, x_px: f64, y_px: f64) {
        if !self.alive {
            return;
        }
        self.pointer.on_pointer_move(x_px, y_px, &mut self.rotation);
    }

    pub fn pointer_up(&mut self) {
        if !self.alive {
            return;
        }
        self.pointer.on_pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        if !self.alive {
            return;
        }
        self.pointer.on_pointer_leave();
    }

    /// Advance one frame: rotation tick, camera tick, telemetry refresh.
    /// Returns `None` once the rig has been shut down.
    pub fn advance(&mut self, now_ms: f64, dt_s: f64) -> Option<Telemetry> {
        if !self.alive {
            return None;
        }

        let drift =
            self.interaction.allows_drift() && !self.has_target && !self.pointer.is_dragging();
        self.rotation.tick(dt_s, drift);
        self.camera.tick(now_ms);
        self.telemetry = telemetry::project(&self.rotation.state, self.camera.distance());
        Some(self.telemetry)
    }

    /// Synchronous teardown: every later call on this rig is a no-op.
    pub fn shutdown(&mut self) {
        self.alive = false;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation.state
    }

    pub fn distance(&self) -> f64 {
        self.camera.distance()
    }

    pub fn telemetry(&self) -> Telemetry {
        self.telemetry
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.is_dragging()
    }

    pub fn debug_info(&self) -> String {
        format!(
            "mode: {:?}, current: ({:.3}, {:.3}), target: ({:.3}, {:.3}), distance: {:.1}, dragging: {}",
            self.interaction,
            self.rotation.state.current.x,
            self.rotation.state.current.y,
            self.rotation.state.target.x,
            self.rotation.state.target.y,
            self.camera.distance(),
            self.pointer.is_dragging(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::OrbitRig;
    use crate::camera::{DIST_CINEMATIC, DIST_EXPLORE, DIST_REVEAL_FAR};
    use crate::mode::{InteractionMode, ModeFlags};
    use crate::pointer::ROT_SPEED_RAD_PER_PX;
    use crate::rotation::LON_FACING_OFFSET_DEG;
    use foundation::time::REF_DT_S;

    const STEP_MS: f64 = 1000.0 / 60.0;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn run(rig: &mut OrbitRig, start_ms: f64, ticks: usize) -> f64 {
        let mut now = start_ms;
        for _ in 0..ticks {
            now += STEP_MS;
            rig.advance(now, REF_DT_S);
        }
        now
    }

    #[test]
    fn idle_rig_drifts_eastward() {
        let mut rig = OrbitRig::new(ModeFlags::default(), 0.0);
        let mut prev = rig.rotation().target.y;
        let mut now = 0.0;
        for _ in 0..100 {
            now += STEP_MS;
            rig.advance(now, REF_DT_S);
            assert!(rig.rotation().target.y > prev);
            prev = rig.rotation().target.y;
        }
    }

    #[test]
    fn travel_request_converges_and_locks() {
        let mut rig = OrbitRig::new(ModeFlags::default(), 0.0);
        rig.set_target_coordinates(36.8, -1.3);
        assert_eq!(rig.interaction_mode(), InteractionMode::CinematicLocked);

        run(&mut rig, 0.0, 200);
        let expected_y = (36.8 + LON_FACING_OFFSET_DEG).to_radians();
        assert_close(rig.rotation().current.y, expected_y, 0.01);
        assert_close(rig.rotation().current.x, (-1.3f64).to_radians(), 0.01);
    }

    #[test]
    fn drag_beats_external_target() {
        let mut rig = OrbitRig::new(ModeFlags::default(), 0.0);
        rig.pointer_down(0.0, 0.0);
        rig.pointer_move(100.0, 0.0);

        // A target arriving mid-drag is dropped, not queued.
        rig.set_target_coordinates(36.8, -1.3);
        assert_eq!(rig.interaction_mode(), InteractionMode::ManualOverride);
        assert_close(rig.rotation().target.y, 100.0 * ROT_SPEED_RAD_PER_PX, 1e-12);

        rig.pointer_up();
        run(&mut rig, 0.0, 50);
        // Still overriding: the dropped target never replays.
        assert_eq!(rig.interaction_mode(), InteractionMode::ManualOverride);

        // A fresh target after the drag ends is honored.
        rig.set_target_coordinates(36.8, -1.3);
        assert_eq!(rig.interaction_mode(), InteractionMode::CinematicLocked);
    }

    #[test]
    fn manual_override_suspends_drift() {
        let mut rig = OrbitRig::new(ModeFlags::default(), 0.0);
        rig.pointer_down(0.0, 0.0);
        rig.pointer_up();

        // Inertia is zero (no movement), so target must hold still.
        let before = rig.rotation().target.y;
        run(&mut rig, 0.0, 100);
        assert_close(rig.rotation().target.y, before, 1e-12);
    }

    #[test]
    fn reveal_flight_lands_at_explore_distance() {
        let flags = ModeFlags {
            cinematic: false,
            revealing: true,
        };
        let mut rig = OrbitRig::new(flags, 0.0);
        assert_eq!(rig.distance(), DIST_REVEAL_FAR);

        rig.advance(3_000.0, REF_DT_S);
        assert_eq!(rig.distance(), DIST_EXPLORE);
    }

    #[test]
    fn cinematic_flag_pulls_camera_near() {
        let mut rig = OrbitRig::new(ModeFlags::default(), 0.0);
        rig.set_mode_flags(
            ModeFlags {
                cinematic: true,
                revealing: false,
            },
            1_000.0,
        );
        rig.advance(1_000.0 + 2_500.0, REF_DT_S);
        assert_eq!(rig.distance(), DIST_CINEMATIC);
    }

    #[test]
    fn telemetry_tracks_state_every_frame() {
        let mut rig = OrbitRig::new(ModeFlags::default(), 0.0);
        rig.set_target_coordinates(0.0, 45.0);
        run(&mut rig, 0.0, 300);
        let t = rig.telemetry();
        assert_close(t.lat_deg, 45.0, 0.5);
        assert!(t.altitude_km > 0.0);
    }

    #[test]
    fn shutdown_freezes_all_state() {
        let mut rig = OrbitRig::new(ModeFlags::default(), 0.0);
        run(&mut rig, 0.0, 10);
        rig.shutdown();

        let frozen_rotation = *rig.rotation();
        let frozen_distance = rig.distance();

        assert!(rig.advance(10_000.0, REF_DT_S).is_none());
        rig.pointer_down(5.0, 5.0);
        rig.pointer_move(500.0, 500.0);
        rig.set_target_coordinates(100.0, 50.0);
        rig.set_mode_flags(
            ModeFlags {
                cinematic: true,
                revealing: false,
            },
            20_000.0,
        );
        assert!(rig.advance(30_000.0, REF_DT_S).is_none());

        assert_eq!(*rig.rotation(), frozen_rotation);
        assert_eq!(rig.distance(), frozen_distance);
        assert!(!rig.is_alive());
    }

    #[test]
    fn debug_info_names_the_mode() {
        let rig = OrbitRig::new(ModeFlags::default(), 0.0);
        assert!(rig.debug_info().contains("AutoDrift"));
    }
}
