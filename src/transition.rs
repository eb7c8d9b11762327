use std::time::{Duration, Instant};

use crate::{geometry::Rect, scale::Rgb};

/// Linear interpolation between two values of the same kind.
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Rgb {
    fn lerp(self, to: Self, t: f64) -> Self {
        let channel = |a: u8, b: u8| f64::from(a).lerp(f64::from(b), t).round() as u8;
        Rgb(
            channel(self.0, to.0),
            channel(self.1, to.1),
            channel(self.2, to.2),
        )
    }
}

impl Lerp for Rect {
    fn lerp(self, to: Self, t: f64) -> Self {
        Rect::new(
            self.x.lerp(to.x, t),
            self.y.lerp(to.y, t),
            self.width.lerp(to.width, t),
            self.height.lerp(to.height, t),
        )
    }
}

/// Cubic in-out easing over `t` in `[0, 1]`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// A value animating from `from` to `to` over `duration`, starting at `start`.
#[derive(Debug, Clone, Copy)]
pub struct Transition<T: Lerp> {
    from: T,
    to: T,
    start: Instant,
    duration: Duration,
}

impl<T: Lerp> Transition<T> {
    /// A transition that is already at rest on `value`.
    pub fn settled(value: T, now: Instant) -> Self {
        Self {
            from: value,
            to: value,
            start: now,
            duration: Duration::ZERO,
        }
    }

    /// The eased value at `now`.
    pub fn value_at(&self, now: Instant) -> T {
        if self.duration.is_zero() {
            return self.to;
        }

        let elapsed = now.saturating_duration_since(self.start);
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        if t >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, ease_cubic_in_out(t))
    }

    /// The value the transition is heading to.
    pub fn target(&self) -> T {
        self.to
    }

    /// Restarts the animation from wherever it is at `now` towards `to`.
    pub fn retarget(&mut self, to: T, now: Instant, duration: Duration) {
        self.from = self.value_at(now);
        self.to = to;
        self.start = now;
        self.duration = duration;
    }

    pub fn is_settled(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }
}
