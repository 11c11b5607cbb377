//! Paged carousel behavior for a horizontally overflowing row of columns
//!
//! The controller owns the snap points, the scroll target and the active page.
//! The host feeds it input through `on_wheel`, `on_resize` and
//! `on_layout_inputs_changed`, and drives motion by calling `tick` once per
//! frame while `needs_frame` is true.
//!
//! `on_scroll` is for surfaces with their own native scrolling, such as a
//! touchpad-driven view, which move the offset without the controller. The
//! terminal grid only moves through the controller and never calls it.

use std::time::Instant;

use super::animation::{MotionKind, ScrollAnimator, Step};
use super::config::{ScrollConfig, ScrollConfigExt};
use super::snap::SnapPoints;
use super::wheel::{WheelEvent, WheelInputInterpreter};

/// Geometry and scroll position of whatever is being scrolled
pub trait ScrollSurface {
    fn viewport_width(&self) -> f64;
    fn content_width(&self) -> f64;
    /// Tile width plus the gap between columns
    fn column_step(&self) -> f64;
    fn scroll_offset(&self) -> f64;
    fn set_scroll_offset(&mut self, offset: f64);
}

/// What the render surface needs to draw page indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapState {
    pub page_count: usize,
    pub active_page_index: usize,
}

/// Inputs that change which columns exist; any change resets to the first page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutInputs {
    pub query_hash: u64,
    pub rows: u16,
    pub columns: u16,
    pub icon_size: u16,
    pub visible_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// Not handled; the host may apply its own behavior
    Ignored,
    /// The controller took over the motion
    Consumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No animation in flight
    Idle,
    /// The offset moved toward the target
    Moved,
    /// At the target, waiting for wheel input to go idle before re-snapping
    Holding,
    /// Came to rest on a page
    Settled,
}

pub struct PagedScrollController<S: ScrollSurface> {
    surface: S,
    config: ScrollConfig,
    snaps: SnapPoints,
    animator: ScrollAnimator,
    wheel: WheelInputInterpreter,
    active_page: usize,
    overlay_open: bool,
    last_wheel_at: Option<Instant>,
    last_wheel_direction: f64,
    last_scroll_sync: Option<Instant>,
    layout_inputs: Option<LayoutInputs>,
    frames_run: u64,
}

impl<S: ScrollSurface> PagedScrollController<S> {
    pub fn new(surface: S, config: ScrollConfig) -> Self {
        let mut controller = Self {
            surface,
            animator: ScrollAnimator::new(&config),
            wheel: WheelInputInterpreter::new(&config),
            config,
            snaps: SnapPoints::single(),
            active_page: 0,
            overlay_open: false,
            last_wheel_at: None,
            last_wheel_direction: 0.0,
            last_scroll_sync: None,
            layout_inputs: None,
            frames_run: 0,
        };
        controller.recompute_snaps();
        controller
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for geometry updates; follow with `on_resize`
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn snap_points(&self) -> &SnapPoints {
        &self.snaps
    }

    pub fn snap_state(&self) -> SnapState {
        SnapState {
            page_count: self.snaps.page_count(),
            active_page_index: self.active_page,
        }
    }

    #[inline]
    pub fn needs_frame(&self) -> bool {
        self.animator.is_animating()
    }

    /// Ticks that moved, held or settled the scroller
    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    pub fn set_overlay_open(&mut self, open: bool) {
        self.overlay_open = open;
    }

    pub fn overlay_open(&self) -> bool {
        self.overlay_open
    }

    fn recompute_snaps(&mut self) {
        self.snaps = SnapPoints::compute(
            self.surface.content_width(),
            self.surface.viewport_width(),
            self.surface.column_step(),
        );
        self.active_page = self.active_page.min(self.snaps.page_count() - 1);
    }

    fn collapse_to_single_page(&mut self) {
        self.animator.stop();
        self.active_page = 0;
        if self.surface.scroll_offset() != 0.0 {
            self.surface.set_scroll_offset(0.0);
        }
    }

    pub fn on_wheel(&mut self, event: WheelEvent, now: Instant) -> WheelOutcome {
        if self.overlay_open {
            return WheelOutcome::Ignored;
        }

        self.recompute_snaps();
        if self.snaps.is_single_page() {
            self.collapse_to_single_page();
            return WheelOutcome::Ignored;
        }

        let delta = self.wheel.normalize(&event, self.surface.viewport_width());
        if self.wheel.is_noise(delta) {
            return WheelOutcome::Ignored;
        }

        let base = self
            .animator
            .target()
            .unwrap_or_else(|| self.surface.scroll_offset());
        let target = self.wheel.target(base, delta, &self.snaps);

        self.last_wheel_at = Some(now);
        self.last_wheel_direction = delta.signum();
        self.active_page = self.snaps.nearest_index(target);
        self.animator.animate_to(target, MotionKind::Wheel);
        WheelOutcome::Consumed
    }

    /// Animate to page `index`, clamped to the available pages
    pub fn scroll_to_page(&mut self, index: usize) {
        self.recompute_snaps();
        let index = index.min(self.snaps.page_count() - 1);
        let target = self.snaps.offset_of(index);

        self.last_wheel_at = None;
        self.active_page = index;

        let current = self.surface.scroll_offset();
        if !self.animator.is_animating() && self.animator.within_epsilon(current, target) {
            return;
        }
        self.animator.animate_to(target, MotionKind::PageJump);
    }

    pub fn next_page(&mut self) {
        self.scroll_to_page(self.active_page + 1);
    }

    pub fn prev_page(&mut self) {
        self.scroll_to_page(self.active_page.saturating_sub(1));
    }

    /// Viewport geometry changed; keeps the current offset where possible
    pub fn on_resize(&mut self) {
        self.recompute_snaps();
        if self.snaps.is_single_page() {
            self.collapse_to_single_page();
            return;
        }

        let max = self.snaps.max_offset();
        let current = self.surface.scroll_offset();
        if current > max {
            self.surface.set_scroll_offset(max);
        }
        if let (Some(target), Some(kind)) = (self.animator.target(), self.animator.kind()) {
            if target > max {
                self.animator.animate_to(max, kind);
            }
        }
        self.active_page = self.snaps.nearest_index(self.surface.scroll_offset());
    }

    /// Rebuild pages after the visible column set changed
    ///
    /// Returns whether the inputs differed from the previous call, in which
    /// case the scroller is reset to the first page.
    pub fn on_layout_inputs_changed(&mut self, inputs: LayoutInputs) -> bool {
        if self.layout_inputs == Some(inputs) {
            return false;
        }
        self.layout_inputs = Some(inputs);

        self.animator.stop();
        self.last_wheel_at = None;
        self.last_wheel_direction = 0.0;
        self.active_page = 0;
        self.surface.set_scroll_offset(0.0);
        self.recompute_snaps();
        true
    }

    /// The offset changed outside the controller's animation
    ///
    /// Only hosts whose surface scrolls natively need this. Recomputes the
    /// active page at most once per frame interval. Returns whether a
    /// recomputation happened.
    pub fn on_scroll(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_scroll_sync {
            if now.saturating_duration_since(last) < self.config.frame_interval() {
                return false;
            }
        }
        self.last_scroll_sync = Some(now);
        self.active_page = self.snaps.nearest_index(self.surface.scroll_offset());
        true
    }

    /// Advance the animation by one frame
    pub fn tick(&mut self, now: Instant) -> FrameOutcome {
        let outcome = match self.animator.step(self.surface.scroll_offset()) {
            Step::Idle => FrameOutcome::Idle,
            Step::Moved(offset) => {
                self.surface.set_scroll_offset(offset);
                FrameOutcome::Moved
            }
            Step::Arrived { offset, kind } => {
                self.surface.set_scroll_offset(offset);
                match kind {
                    MotionKind::PageJump => self.settle(offset),
                    MotionKind::Wheel => self.settle_wheel(offset, now),
                }
            }
        };
        if outcome != FrameOutcome::Idle {
            self.frames_run += 1;
        }
        outcome
    }

    fn settle(&mut self, offset: f64) -> FrameOutcome {
        self.animator.stop();
        self.active_page = self.snaps.nearest_index(offset);
        FrameOutcome::Settled
    }

    fn settle_wheel(&mut self, offset: f64, now: Instant) -> FrameOutcome {
        let idle = self
            .last_wheel_at
            .map_or(true, |at| now.saturating_duration_since(at) >= self.config.wheel_idle());
        if !idle {
            return FrameOutcome::Holding;
        }

        self.recompute_snaps();
        let snap = self.resnap_target(offset);
        if self.animator.within_epsilon(offset, snap) {
            if offset != snap {
                self.surface.set_scroll_offset(snap);
            }
            return self.settle(snap);
        }

        self.animator.animate_to(snap, MotionKind::Wheel);
        self.active_page = self.snaps.nearest_index(snap);
        FrameOutcome::Moved
    }

    /// Nearest page within the magnet radius, else the next page in the last
    /// wheel direction
    fn resnap_target(&self, offset: f64) -> f64 {
        let nearest_index = self.snaps.nearest_index(offset);
        let nearest = self.snaps.offset_of(nearest_index);
        if (nearest - offset).abs() <= self.config.magnet_radius(self.snaps.column_step()) {
            return nearest;
        }
        let index = self
            .snaps
            .directional_index(offset, self.last_wheel_direction);
        self.snaps.offset_of(index)
    }
}
