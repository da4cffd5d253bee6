//! Zoom level ↔ zoom factor conversion.
//!
//! A zoom level is the exponent of a fixed base: `factor = 1.2^level`.
//! Level 0 is 100%, each whole step scales by 20%.

/// Base of the level ↔ factor conversion.
pub const ZOOM_LEVEL_BASE: f64 = 1.2;

/// Convert a zoom level to a zoom factor.
pub fn zoom_level_to_factor(level: f64) -> f64 {
    ZOOM_LEVEL_BASE.powf(level)
}

/// Convert a zoom factor to a zoom level.
pub fn zoom_factor_to_level(factor: f64) -> f64 {
    factor.ln() / ZOOM_LEVEL_BASE.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_level_zero_is_identity() {
        assert!(approx(zoom_level_to_factor(0.0), 1.0));
        assert!(approx(zoom_factor_to_level(1.0), 0.0));
    }

    #[test]
    fn test_conversion_is_lossless() {
        for level in [-3.0, -0.5, 0.0, 1.0, 2.5, 7.0] {
            assert!(approx(zoom_factor_to_level(zoom_level_to_factor(level)), level));
        }
        assert!(approx(zoom_level_to_factor(1.0), 1.2));
        assert!(approx(zoom_level_to_factor(2.0), 1.44));
    }

    #[test]
    fn test_degenerate_factors() {
        assert_eq!(zoom_factor_to_level(0.0), f64::NEG_INFINITY);
        assert!(zoom_factor_to_level(-1.0).is_nan());
    }
}
