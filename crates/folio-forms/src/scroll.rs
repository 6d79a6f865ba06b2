//! Smooth scrolling
//!
//! An owned scroll controller handed to whichever view needs scroll-to
//! behaviour. It does nothing until [`ScrollController::start`] and ignores
//! every call after [`ScrollController::dispose`].

use std::time::{Duration, Instant};

pub type Easing = fn(f64) -> f64;

/// Exponential ease-out.
pub fn ease_out_expo(t: f64) -> f64 {
    (1.001 - 2f64.powf(-10.0 * t)).min(1.0)
}

#[derive(Clone, Copy, Debug)]
pub struct ScrollOptions {
    /// Zero switches to per-tick `lerp` interpolation.
    pub duration: Duration,
    pub lerp: f64,
    pub easing: Easing,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self { duration: Duration::from_millis(1500), lerp: 0.1, easing: ease_out_expo }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle { Created, Running, Disposed }

#[derive(Clone, Copy, Debug)]
struct Animation {
    from: f64,
    to: f64,
    started: Instant,
    options: ScrollOptions,
}

/// Offsets closer than this snap to the target.
const SNAP: f64 = 0.5;

#[derive(Debug)]
pub struct ScrollController {
    lifecycle: Lifecycle,
    offset: f64,
    animation: Option<Animation>,
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollController {
    pub fn new() -> Self {
        Self { lifecycle: Lifecycle::Created, offset: 0.0, animation: None }
    }

    pub fn lifecycle(&self) -> Lifecycle { self.lifecycle }
    pub fn offset(&self) -> f64 { self.offset }
    pub fn is_animating(&self) -> bool { self.animation.is_some() }

    pub fn start(&mut self) {
        if self.lifecycle == Lifecycle::Created {
            self.lifecycle = Lifecycle::Running;
        }
    }

    pub fn dispose(&mut self) {
        self.lifecycle = Lifecycle::Disposed;
        self.animation = None;
    }

    /// Begins scrolling from the current offset. Ignored unless running.
    pub fn scroll_to(&mut self, target: f64, options: ScrollOptions, now: Instant) -> bool {
        if self.lifecycle != Lifecycle::Running {
            return false;
        }
        self.animation = Some(Animation { from: self.offset, to: target.max(0.0), started: now, options });
        true
    }

    /// Jumps straight to `target`, cancelling any animation.
    pub fn jump_to(&mut self, target: f64) {
        if self.lifecycle == Lifecycle::Running {
            self.animation = None;
            self.offset = target.max(0.0);
        }
    }

    /// Advances the animation to `now` and returns the new offset.
    pub fn tick(&mut self, now: Instant) -> f64 {
        let Some(anim) = self.animation else { return self.offset };
        if self.lifecycle != Lifecycle::Running {
            return self.offset;
        }

        if anim.options.duration.is_zero() {
            self.offset += (anim.to - self.offset) * anim.options.lerp.clamp(0.0, 1.0);
            if (anim.to - self.offset).abs() < SNAP {
                self.offset = anim.to;
                self.animation = None;
            }
            return self.offset;
        }

        let elapsed = now.saturating_duration_since(anim.started);
        let t = (elapsed.as_secs_f64() / anim.options.duration.as_secs_f64()).min(1.0);
        self.offset = anim.from + (anim.to - anim.from) * (anim.options.easing)(t);
        if t >= 1.0 {
            self.offset = anim.to;
            self.animation = None;
        }
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        assert!(ease_out_expo(0.0).abs() < 0.01);
        assert_eq!(ease_out_expo(1.0), 1.0);
        assert!(ease_out_expo(0.5) > 0.9);
    }

    #[test]
    fn test_ignored_before_start_and_after_dispose() {
        let now = Instant::now();
        let mut scroll = ScrollController::new();
        assert!(!scroll.scroll_to(500.0, ScrollOptions::default(), now));

        scroll.start();
        assert!(scroll.scroll_to(500.0, ScrollOptions::default(), now));
        scroll.dispose();
        assert!(!scroll.is_animating());
        assert!(!scroll.scroll_to(500.0, ScrollOptions::default(), now));
        assert_eq!(scroll.tick(now + Duration::from_secs(5)), 0.0);

        scroll.start();
        assert_eq!(scroll.lifecycle(), Lifecycle::Disposed);
    }

    #[test]
    fn test_timed_scroll_reaches_target() {
        let start = Instant::now();
        let mut scroll = ScrollController::new();
        scroll.start();
        scroll.scroll_to(1000.0, ScrollOptions::default(), start);

        let mid = scroll.tick(start + Duration::from_millis(300));
        assert!(mid > 0.0 && mid < 1000.0);
        assert_eq!(scroll.tick(start + Duration::from_millis(1500)), 1000.0);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_lerp_scroll_converges() {
        let now = Instant::now();
        let mut scroll = ScrollController::new();
        scroll.start();
        scroll.jump_to(100.0);
        let options = ScrollOptions { duration: Duration::ZERO, lerp: 0.5, ..Default::default() };
        scroll.scroll_to(0.0, options, now);

        assert_eq!(scroll.tick(now), 50.0);
        assert_eq!(scroll.tick(now), 25.0);
        for _ in 0..20 {
            scroll.tick(now);
        }
        assert_eq!(scroll.offset(), 0.0);
        assert!(!scroll.is_animating());
    }
}
