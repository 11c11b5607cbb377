//! Turns raw wheel input into scroll targets with magnetic page snapping

use super::config::{ScrollConfig, ScrollConfigExt};
use super::snap::SnapPoints;

/// Unit of a wheel event's deltas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelEvent {
    pub delta_x: f64,
    pub delta_y: f64,
    pub mode: DeltaMode,
}

impl WheelEvent {
    pub fn lines(delta_x: f64, delta_y: f64) -> Self {
        Self {
            delta_x,
            delta_y,
            mode: DeltaMode::Line,
        }
    }

    pub fn pages(delta_x: f64, delta_y: f64) -> Self {
        Self {
            delta_x,
            delta_y,
            mode: DeltaMode::Page,
        }
    }

    pub fn pixels(delta_x: f64, delta_y: f64) -> Self {
        Self {
            delta_x,
            delta_y,
            mode: DeltaMode::Pixel,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WheelInputInterpreter {
    config: ScrollConfig,
}

impl WheelInputInterpreter {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Signed pixel delta along the dominant axis
    pub fn normalize(&self, event: &WheelEvent, viewport_width: f64) -> f64 {
        let raw = if event.delta_x.abs() > event.delta_y.abs() {
            event.delta_x
        } else {
            event.delta_y
        };
        let scale = match event.mode {
            DeltaMode::Pixel => 1.0,
            DeltaMode::Line => self.config.line_delta_px,
            DeltaMode::Page => viewport_width,
        };
        let delta = raw * scale;
        if delta.is_finite() {
            delta
        } else {
            0.0
        }
    }

    pub fn is_noise(&self, delta: f64) -> bool {
        delta.abs() < self.config.noise_threshold
    }

    /// Unsnapped target after applying a damped share of `delta`
    pub fn free_target(&self, base: f64, delta: f64, max_offset: f64) -> f64 {
        (base + delta * self.config.wheel_gain).clamp(0.0, max_offset.max(0.0))
    }

    /// Pull `free_target` onto a nearby page boundary
    ///
    /// The nearest point wins within the magnet radius. Otherwise the next
    /// point in the direction of travel wins within a wider radius. Beyond
    /// both, the target stays free.
    pub fn magnetize(&self, free_target: f64, direction: f64, snaps: &SnapPoints) -> f64 {
        let radius = self.config.magnet_radius(snaps.column_step());

        let nearest = snaps.offset_of(snaps.nearest_index(free_target));
        if (nearest - free_target).abs() <= radius {
            return nearest;
        }

        let directional = snaps.offset_of(snaps.directional_index(free_target, direction));
        if (directional - free_target).abs() <= radius * self.config.directional_magnet_factor {
            return directional;
        }

        free_target
    }

    /// New scroll target for a normalized `delta` starting from `base`
    pub fn target(&self, base: f64, delta: f64, snaps: &SnapPoints) -> f64 {
        let free = self.free_target(base, delta, snaps.max_offset());
        self.magnetize(free, delta.signum(), snaps)
    }
}
