//! Decorative HUD readout derived from rotation and camera state.
//!
//! Values are display-range reductions of the raw angles, not navigation
//! coordinates: longitude wraps modulo 360 and keeps the texture-facing
//! offset, and altitude is an arbitrary affine scaling of the camera
//! distance. Nothing else may depend on these numbers.

use crate::rotation::RotationState;
use foundation::math::wrap_deg_360;

/// Kilometers shown per scene unit of camera distance. Cosmetic.
pub const ALTITUDE_KM_PER_UNIT: f64 = 22.0;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Telemetry {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub altitude_km: f64,
}

/// Pure projection, recomputed every frame, never stored authoritatively.
pub fn project(rotation: &RotationState, distance: f64) -> Telemetry {
    Telemetry {
        lat_deg: rotation.current.x.to_degrees(),
        lon_deg: wrap_deg_360(rotation.current.y.to_degrees()),
        altitude_km: distance * ALTITUDE_KM_PER_UNIT,
    }
}
