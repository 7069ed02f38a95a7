/// Wrap an angle in degrees to `[0, 360)`.
///
/// This is a display-range reduction, not a normalization to ±180; callers
/// that need signed longitudes must convert themselves.
pub fn wrap_deg_360(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::wrap_deg_360;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn wraps_degrees_to_full_turn() {
        assert_close(wrap_deg_360(370.0), 10.0, 1e-12);
        assert_close(wrap_deg_360(-30.0), 330.0, 1e-12);
        assert_close(wrap_deg_360(360.0), 0.0, 1e-12);
    }
}
