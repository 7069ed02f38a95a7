/// Reference frame step used to calibrate per-step tuning constants (60 Hz).
pub const REF_DT_S: f64 = 1.0 / 60.0;
