use std::time::Duration;

use crate::animation::ease::Ease;

/// A timed opacity interpolation from `from` to `to`.
///
/// The fade is a plain value: it does not tick itself. Owners sample it against their clock on
/// each frame and act on [`OpacityFade::is_finished`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpacityFade {
    from: f32,
    to: f32,
    start: Duration,
    duration: Duration,
    ease: Ease,
}

impl OpacityFade {
    /// Create a fade starting at `start`. Opacities are clamped into `[0, 1]`.
    pub fn new(from: f32, to: f32, start: Duration, duration: Duration, ease: Ease) -> Self {
        Self {
            from: from.clamp(0.0, 1.0),
            to: to.clamp(0.0, 1.0),
            start,
            duration,
            ease,
        }
    }

    /// Opacity at the beginning of the fade.
    pub fn from(&self) -> f32 {
        self.from
    }

    /// Opacity the fade settles on.
    pub fn target(&self) -> f32 {
        self.to
    }

    /// Time the fade started.
    pub fn start(&self) -> Duration {
        self.start
    }

    /// Total fade duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time at which the fade reaches its target.
    pub fn end(&self) -> Duration {
        self.start.saturating_add(self.duration)
    }

    /// Linear progress in `[0, 1]` at `now`. Times before `start` report 0.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Eased opacity at `now`.
    pub fn sample(&self, now: Duration) -> f32 {
        if self.is_finished(now) {
            return self.to;
        }
        let t = self.ease.apply(self.progress(now)) as f32;
        (self.from + (self.to - self.from) * t).clamp(0.0, 1.0)
    }

    /// Return `true` once `now` has reached the end of the fade.
    pub fn is_finished(&self, now: Duration) -> bool {
        now >= self.end()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/fade.rs"]
mod tests;
