//! Exponential ease toward a target offset
//!
//! Each frame covers a fixed share of the remaining distance. The animation
//! ends once the remaining distance drops below the settle epsilon.

use super::config::ScrollConfig;

/// What started the current motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    /// Continuous wheel input, eligible for re-snapping once input stops
    Wheel,
    /// Explicit page navigation; the target is final
    PageJump,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Idle,
    Animating { target: f64, kind: MotionKind },
}

/// Result of advancing one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Nothing to do
    Idle,
    /// Moved part of the way; the new offset
    Moved(f64),
    /// Within epsilon of the target; the offset lands exactly on it
    Arrived { offset: f64, kind: MotionKind },
}

#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    motion: Motion,
    wheel_ease: f64,
    page_ease: f64,
    epsilon: f64,
}

impl ScrollAnimator {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            motion: Motion::Idle,
            wheel_ease: config.wheel_ease.clamp(0.01, 1.0),
            page_ease: config.page_ease.clamp(0.01, 1.0),
            epsilon: config.settle_epsilon_px.max(0.0),
        }
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        matches!(self.motion, Motion::Animating { .. })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Target of the motion in flight
    pub fn target(&self) -> Option<f64> {
        match self.motion {
            Motion::Animating { target, .. } => Some(target),
            Motion::Idle => None,
        }
    }

    pub fn kind(&self) -> Option<MotionKind> {
        match self.motion {
            Motion::Animating { kind, .. } => Some(kind),
            Motion::Idle => None,
        }
    }

    /// Start moving toward `target`, or redirect the motion in flight
    pub fn animate_to(&mut self, target: f64, kind: MotionKind) {
        self.motion = Motion::Animating { target, kind };
    }

    pub fn stop(&mut self) {
        self.motion = Motion::Idle;
    }

    /// Advance one frame starting from `current`
    ///
    /// Arrival leaves the motion in place; the caller decides whether to stop
    /// or keep holding at the target.
    pub fn step(&mut self, current: f64) -> Step {
        let Motion::Animating { target, kind } = self.motion else {
            return Step::Idle;
        };

        let remaining = target - current;
        if remaining.abs() < self.epsilon || !remaining.is_finite() {
            return Step::Arrived {
                offset: target,
                kind,
            };
        }

        let ease = match kind {
            MotionKind::Wheel => self.wheel_ease,
            MotionKind::PageJump => self.page_ease,
        };
        Step::Moved(current + remaining * ease)
    }

    /// Whether `a` and `b` are close enough to count as the same offset
    pub fn within_epsilon(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_arrival(animator: &mut ScrollAnimator, mut current: f64) -> (f64, usize) {
        for frame in 1..1000 {
            match animator.step(current) {
                Step::Moved(next) => current = next,
                Step::Arrived { offset, .. } => return (offset, frame),
                Step::Idle => panic!("animator went idle"),
            }
        }
        panic!("animation did not converge");
    }

    #[test]
    fn test_idle_does_nothing() {
        let mut animator = ScrollAnimator::new(&ScrollConfig::default());
        assert_eq!(animator.step(10.0), Step::Idle);
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_first_frame_covers_ease_share() {
        let mut animator = ScrollAnimator::new(&ScrollConfig::default());
        animator.animate_to(100.0, MotionKind::Wheel);
        let Step::Moved(wheel) = animator.step(0.0) else {
            panic!("expected movement");
        };
        assert!((wheel - 26.0).abs() < 1e-9);

        animator.animate_to(100.0, MotionKind::PageJump);
        let Step::Moved(page) = animator.step(0.0) else {
            panic!("expected movement");
        };
        assert!((page - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_converges_exactly_on_target() {
        let mut animator = ScrollAnimator::new(&ScrollConfig::default());
        animator.animate_to(560.0, MotionKind::PageJump);
        let (offset, frames) = run_to_arrival(&mut animator, 0.0);
        assert_eq!(offset, 560.0);
        assert!(frames > 10);
        // arrival keeps the motion until the caller stops it
        assert!(animator.is_animating());
    }

    #[test]
    fn test_redirect_keeps_single_motion() {
        let mut animator = ScrollAnimator::new(&ScrollConfig::default());
        animator.animate_to(100.0, MotionKind::Wheel);
        animator.animate_to(300.0, MotionKind::Wheel);
        assert_eq!(animator.target(), Some(300.0));
        animator.stop();
        assert_eq!(animator.motion(), Motion::Idle);
    }
}
