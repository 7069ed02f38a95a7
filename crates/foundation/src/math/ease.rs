//! Easing and frame-rate-independent smoothing helpers.
//!
//! Interactive tuning constants are usually quoted per 60 Hz step ("smooth by
//! 0.1 each frame", "decay by 0.95 each frame"). These helpers convert such
//! per-step factors into continuous rates so integration stays correct at any
//! refresh cadence, while reproducing the quoted behavior exactly at the
//! reference step.

/// Quartic ease-out: fast start, asymptotic finish, range `[0, 1] -> [0, 1]`.
pub fn quart_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv * inv
}

/// Continuous rate (per second) equivalent to multiplying by `factor_per_step`
/// once every `step_s` seconds. `factor_per_step` must be in `(0, 1]`.
pub fn rate_from_step_factor(factor_per_step: f64, step_s: f64) -> f64 {
    -factor_per_step.ln() / step_s
}

/// Exponential decay factor for an elapsed `dt_s` at the given rate.
pub fn decay_factor(rate_per_s: f64, dt_s: f64) -> f64 {
    (-rate_per_s * dt_s).exp()
}

/// Smoothing fraction (`current += (target - current) * alpha`) for an elapsed
/// `dt_s` at the given rate. Always in `[0, 1]`: for very long steps the
/// exponential underflows and the fraction saturates at exactly 1.0, which
/// lands on the target rather than overshooting it.
pub fn smoothing_alpha(rate_per_s: f64, dt_s: f64) -> f64 {
    1.0 - (-rate_per_s * dt_s).exp()
}

#[cfg(test)]
mod tests {
    use super::{decay_factor, quart_out, rate_from_step_factor, smoothing_alpha};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn quart_out_endpoints_are_exact() {
        assert_eq!(quart_out(0.0), 0.0);
        assert_eq!(quart_out(1.0), 1.0);
        // Out-of-range inputs clamp instead of extrapolating.
        assert_eq!(quart_out(-2.0), 0.0);
        assert_eq!(quart_out(7.5), 1.0);
    }

    #[test]
    fn quart_out_is_monotonic() {
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = quart_out(i as f64 / 100.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn step_factor_round_trips_at_reference_step() {
        let step = 1.0 / 60.0;
        let rate = rate_from_step_factor(0.95, step);
        assert_close(decay_factor(rate, step), 0.95, 1e-12);
        // Two steps compose multiplicatively.
        assert_close(decay_factor(rate, 2.0 * step), 0.95 * 0.95, 1e-12);
    }

    #[test]
    fn smoothing_alpha_matches_per_step_fraction() {
        let step = 1.0 / 60.0;
        let rate = rate_from_step_factor(0.9, step);
        assert_close(smoothing_alpha(rate, step), 0.1, 1e-12);
    }

    #[test]
    fn smoothing_alpha_saturates_for_long_steps() {
        let step = 1.0 / 60.0;
        let rate = rate_from_step_factor(0.9, step);
        // exp(-rate * 10) underflows past f64 epsilon, so the fraction
        // saturates at exactly 1.0: a full step onto the target, no overshoot.
        let alpha = smoothing_alpha(rate, 10.0);
        assert!(alpha > 0.999);
        assert!(alpha <= 1.0);
    }
}
