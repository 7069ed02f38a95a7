//! Pointer interaction: converts pixel drags into rotation deltas and
//! inertial velocity.
//!
//! Horizontal screen motion maps to the azimuthal spin, vertical motion to
//! the polar tilt. Deltas go straight to the rotation target (bypassing
//! drift), and the last applied delta is kept as inertia so releasing
//! mid-swipe lets the globe coast.

use crate::rotation::{POLE_LIMIT_RAD, RotationModel};
use foundation::math::Vec2;

/// Drag sensitivity, radians per pixel.
pub const ROT_SPEED_RAD_PER_PX: f64 = 0.005;

#[derive(Debug, Default, Clone)]
pub struct PointerController {
    dragging: bool,
    manual_override: bool,
    last_x_px: f64,
    last_y_px: f64,
}

impl PointerController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn manual_override(&self) -> bool {
        self.manual_override
    }

    /// A fresh external target resumes target-following.
    pub fn clear_override(&mut self) {
        self.manual_override = false;
    }

    pub fn on_pointer_down(&mut self, x_px: f64, y_px: f64, rotation: &mut RotationModel) {
        self.dragging = true;
        self.manual_override = true;
        self.last_x_px = x_px;
        self.last_y_px = y_px;
        rotation.state.inertia = Vec2::ZERO;
    }

    pub fn on_pointer_move(&mut self, x_px: f64, y_px: f64, rotation: &mut RotationModel) {
        if !self.dragging {
            return;
        }

        let dx = x_px - self.last_x_px;
        let dy = y_px - self.last_y_px;
        self.last_x_px = x_px;
        self.last_y_px = y_px;

        let delta = Vec2::new(dy * ROT_SPEED_RAD_PER_PX, dx * ROT_SPEED_RAD_PER_PX);
        rotation.state.target = rotation.state.target + delta;
        rotation.state.target.x = rotation
            .state
            .target
            .x
            .clamp(-POLE_LIMIT_RAD, POLE_LIMIT_RAD);

        // The just-applied delta becomes the coast velocity.
        rotation.state.inertia = delta;
    }

    pub fn on_pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Pointer left the surface. Also the recovery path for a lost
    /// pointer-up, so `dragging` can never get stuck.
    pub fn on_pointer_leave(&mut self) {
        self.dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{POLE_LIMIT_RAD, PointerController, ROT_SPEED_RAD_PER_PX};
    use crate::rotation::RotationModel;
    use foundation::math::Vec2;
    use foundation::time::REF_DT_S;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn horizontal_drag_spins_azimuth() {
        let mut rot = RotationModel::new();
        let mut ptr = PointerController::new();

        ptr.on_pointer_down(200.0, 300.0, &mut rot);
        ptr.on_pointer_move(300.0, 300.0, &mut rot);
        ptr.on_pointer_up();

        assert_close(rot.state.target.y, 100.0 * ROT_SPEED_RAD_PER_PX, 1e-12);
        assert_close(rot.state.target.x, 0.0, 1e-12);
        assert!(ptr.manual_override());
    }

    #[test]
    fn vertical_drag_tilts_and_clamps() {
        let mut rot = RotationModel::new();
        let mut ptr = PointerController::new();

        ptr.on_pointer_down(0.0, 0.0, &mut rot);
        // 10k px down would tilt 50 rad without the guard.
        ptr.on_pointer_move(0.0, 10_000.0, &mut rot);

        assert_close(rot.state.target.x, POLE_LIMIT_RAD, 1e-12);
    }

    #[test]
    fn pointer_down_resets_inertia() {
        let mut rot = RotationModel::new();
        rot.state.inertia = Vec2::new(0.01, 0.03);
        let mut ptr = PointerController::new();
        ptr.on_pointer_down(0.0, 0.0, &mut rot);
        assert_eq!(rot.state.inertia, Vec2::ZERO);
    }

    #[test]
    fn release_mid_swipe_keeps_coasting() {
        let mut rot = RotationModel::new();
        let mut ptr = PointerController::new();

        ptr.on_pointer_down(0.0, 0.0, &mut rot);
        ptr.on_pointer_move(40.0, 0.0, &mut rot);
        ptr.on_pointer_up();

        assert!(rot.state.inertia.y > 0.0);
        let after_release = rot.state.target.y;
        rot.tick(REF_DT_S, false);
        assert!(rot.state.target.y > after_release);
    }

    #[test]
    fn moves_without_a_drag_are_ignored() {
        let mut rot = RotationModel::new();
        let mut ptr = PointerController::new();
        ptr.on_pointer_move(500.0, 500.0, &mut rot);
        assert_eq!(rot.state.target, Vec2::ZERO);
    }

    #[test]
    fn pointer_leave_unsticks_a_lost_drag() {
        let mut rot = RotationModel::new();
        let mut ptr = PointerController::new();
        ptr.on_pointer_down(0.0, 0.0, &mut rot);
        ptr.on_pointer_leave();
        assert!(!ptr.is_dragging());

        // A stray move afterwards must do nothing.
        ptr.on_pointer_move(100.0, 0.0, &mut rot);
        assert_eq!(rot.state.target.y, 0.0);
    }

    #[test]
    fn override_persists_until_cleared() {
        let mut rot = RotationModel::new();
        let mut ptr = PointerController::new();
        ptr.on_pointer_down(0.0, 0.0, &mut rot);
        ptr.on_pointer_up();
        assert!(ptr.manual_override());
        ptr.clear_override();
        assert!(!ptr.manual_override());
    }
}
