//! Zoom limits.
//!
//! Level ↔ factor conversion lives in `framekit_common::zoom` and is
//! re-exported here.

use framekit_common::serde_helpers::non_finite_f64;
use framekit_common::ZoomConfig;
use serde::{Deserialize, Serialize};

pub use framekit_common::zoom::{zoom_factor_to_level, zoom_level_to_factor, ZOOM_LEVEL_BASE};

/// Inclusive range of accepted zoom levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    #[serde(with = "non_finite_f64")]
    pub min_level: f64,
    #[serde(with = "non_finite_f64")]
    pub max_level: f64,
}

impl ZoomLimits {
    /// Build limits from zoom factors.
    pub fn from_factors(min_factor: f64, max_factor: f64) -> Self {
        Self {
            min_level: zoom_factor_to_level(min_factor),
            max_level: zoom_factor_to_level(max_factor),
        }
    }

    /// Clamp a requested level into range. NaN requests fall to the minimum.
    pub fn clamp(&self, level: f64) -> f64 {
        if level.is_nan() {
            return self.min_level;
        }
        level.max(self.min_level).min(self.max_level)
    }

    pub fn contains(&self, level: f64) -> bool {
        level >= self.min_level && level <= self.max_level
    }

    /// The range accepted by both `self` and `other`.
    ///
    /// When the two do not overlap, or `other` is not a valid range, `self`
    /// is returned unchanged.
    pub fn intersect(&self, other: &ZoomLimits) -> ZoomLimits {
        let min_level = self.min_level.max(other.min_level);
        let max_level = self.max_level.min(other.max_level);
        if min_level <= max_level {
            ZoomLimits {
                min_level,
                max_level,
            }
        } else {
            *self
        }
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self::from(&ZoomConfig::default())
    }
}

impl From<&ZoomConfig> for ZoomLimits {
    fn from(config: &ZoomConfig) -> Self {
        Self::from_factors(config.min_zoom_factor, config.max_zoom_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn limits(min_level: f64, max_level: f64) -> ZoomLimits {
        ZoomLimits {
            min_level,
            max_level,
        }
    }

    #[test]
    fn test_limits_clamp() {
        let limits = limits(-1.0, 1.5);
        assert_eq!(limits.clamp(2.0), 1.5);
        assert_eq!(limits.clamp(-4.0), -1.0);
        assert_eq!(limits.clamp(0.3), 0.3);
        assert_eq!(limits.clamp(f64::NAN), -1.0);
        assert_eq!(limits.clamp(f64::INFINITY), 1.5);
        assert_eq!(limits.clamp(f64::NEG_INFINITY), -1.0);
        assert!(limits.contains(1.5));
        assert!(!limits.contains(1.6));
    }

    #[test]
    fn test_inverted_limits_do_not_panic() {
        assert_eq!(limits(2.0, -2.0).clamp(0.0), -2.0);
    }

    #[test]
    fn test_intersect() {
        let outer = limits(-3.0, 3.0);
        assert_eq!(outer.intersect(&limits(-1.0, 1.0)), limits(-1.0, 1.0));
        assert_eq!(outer.intersect(&limits(-5.0, 2.0)), limits(-3.0, 2.0));
        assert_eq!(outer.intersect(&limits(4.0, 6.0)), outer);
        assert_eq!(outer.intersect(&limits(1.0, -1.0)), outer);
        assert_eq!(outer.intersect(&limits(f64::NAN, f64::NAN)), outer);
    }

    #[test]
    fn test_default_limits_match_config_factors() {
        let limits = ZoomLimits::default();
        assert!(approx(zoom_level_to_factor(limits.min_level), 0.25));
        assert!(approx(zoom_level_to_factor(limits.max_level), 5.0));
    }
}
