//! Interaction mode bookkeeping.

/// Host-owned phase flags driving the camera distance table.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ModeFlags {
    /// Camera is locked to host-supplied targets (narrative travel).
    pub cinematic: bool,
    /// Initial reveal: mount far out, fly in slowly.
    pub revealing: bool,
}

/// Who currently drives the rotation target.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum InteractionMode {
    /// Nobody: slow eastward auto-rotation.
    #[default]
    AutoDrift,
    /// The user grabbed the globe; drift and external targets are suspended
    /// until a fresh target arrives after the drag ends.
    ManualOverride,
    /// A host-supplied coordinate is being followed.
    CinematicLocked,
}

impl InteractionMode {
    pub fn allows_drift(self) -> bool {
        self == InteractionMode::AutoDrift
    }
}

#[cfg(test)]
mod tests {
    use super::InteractionMode;

    #[test]
    fn only_auto_drift_drifts() {
        assert!(InteractionMode::AutoDrift.allows_drift());
        assert!(!InteractionMode::ManualOverride.allows_drift());
        assert!(!InteractionMode::CinematicLocked.allows_drift());
    }
}
