//! Derived values for the scroll engine's configuration

use std::time::Duration;

pub use tabdeck_core::ScrollConfig;

/// Extension trait for ScrollConfig with utility methods
pub trait ScrollConfigExt {
    /// Time between animation frames
    fn frame_interval(&self) -> Duration;

    /// Wheel inactivity after which a settled animation re-snaps
    fn wheel_idle(&self) -> Duration;

    /// Distance within which a target is pulled onto a snap point
    fn magnet_radius(&self, column_step: f64) -> f64;
}

impl ScrollConfigExt for ScrollConfig {
    #[inline]
    fn frame_interval(&self) -> Duration {
        if self.animation_fps == 0 {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(1000 / self.animation_fps as u64)
        }
    }

    #[inline]
    fn wheel_idle(&self) -> Duration {
        Duration::from_millis(self.wheel_idle_ms)
    }

    #[inline]
    fn magnet_radius(&self, column_step: f64) -> f64 {
        let scaled = column_step * self.magnet_column_ratio;
        if scaled.is_finite() {
            self.magnet_min_px.max(scaled)
        } else {
            self.magnet_min_px
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScrollConfig::default();
        assert_eq!(config.wheel_ease, 0.26);
        assert_eq!(config.page_ease, 0.22);
        assert_eq!(config.settle_epsilon_px, 0.4);
        assert_eq!(config.wheel_idle(), Duration::from_millis(85));
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_zero_fps_falls_back() {
        let config = ScrollConfig {
            animation_fps: 0,
            ..Default::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_magnet_radius() {
        let config = ScrollConfig::default();
        assert!((config.magnet_radius(140.0) - 30.8).abs() < 1e-9);
        assert_eq!(config.magnet_radius(100.0), 28.0);
        assert_eq!(config.magnet_radius(f64::NAN), 28.0);
    }
}
