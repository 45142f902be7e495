//! Tweening
//!
//! A [`Tween`] is a pure function of elapsed time: `(from, to, duration, delay,
//! ease)`. A [`Timeline`] holds running tweens plus delayed one-shot calls and
//! samples them once per [`Timeline::advance`], which the owner calls from its
//! clock tick handler. Nothing runs on a background thread.

use crate::foundation::math::utils::{clamp, lerp};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Shared animatable scalar (opacity, alpha, volume, progress)
///
/// Clones share the same value, so a tween setter and the subsystem reading
/// the value can each hold one.
#[derive(Clone, Default)]
pub struct Param(Rc<Cell<f32>>);

impl Param {
    /// Create a parameter holding `value`
    pub fn new(value: f32) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    /// Current value
    pub fn get(&self) -> f32 {
        self.0.get()
    }

    /// Overwrite the value
    pub fn set(&self, value: f32) {
        self.0.set(value);
    }

    /// Setter closure for [`Timeline::from_to`] and [`Timeline::to`]
    pub fn setter(&self) -> impl FnMut(f32) + 'static {
        let cell = Rc::clone(&self.0);
        move |value| cell.set(value)
    }

    /// True if both handles share one value
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Param").field(&self.get()).finish()
    }
}

/// Easing curves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ease {
    /// Constant rate
    Linear,
    /// Quadratic ease-out; the default curve
    #[default]
    QuadOut,
    /// Cubic ease-in
    CubicIn,
}

impl Ease {
    /// Map linear progress in `[0, 1]` onto the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = clamp(t, 0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadOut => t * (2.0 - t),
            Self::CubicIn => t * t * t,
        }
    }
}

/// Interpolation between two values over time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    /// Value before and at the start
    pub from: f32,
    /// Value at and after the end
    pub to: f32,
    /// Length of the interpolation
    pub duration: f32,
    /// Time before the interpolation starts
    pub delay: f32,
    /// Curve applied to linear progress
    pub ease: Ease,
}

impl Tween {
    /// Tween with no delay and the default ease
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            delay: 0.0,
            ease: Ease::default(),
        }
    }

    /// Set the start delay
    #[must_use]
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Set the easing curve
    #[must_use]
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Value `elapsed` time after the tween was scheduled
    pub fn value_at(&self, elapsed: f32) -> f32 {
        let local = elapsed - self.delay;
        if local <= 0.0 {
            return self.from;
        }
        if self.duration <= 0.0 || local >= self.duration {
            return self.to;
        }
        lerp(self.from, self.to, self.ease.apply(local / self.duration))
    }

    /// Time from scheduling until the tween settles on `to`
    pub fn end_time(&self) -> f32 {
        self.delay + self.duration.max(0.0)
    }
}

struct Track {
    scheduled_at: f64,
    tween: Tween,
    apply: Box<dyn FnMut(f32)>,
}

struct DelayedCall {
    due: f64,
    call: Box<dyn FnOnce()>,
}

/// Scheduler for tweens and delayed calls
///
/// Setters and calls run inside [`Timeline::advance`] and must not schedule
/// onto the same timeline.
#[derive(Default)]
pub struct Timeline {
    now: f64,
    tracks: Vec<Track>,
    calls: Vec<DelayedCall>,
}

impl Timeline {
    /// Create an empty timeline at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a tween and apply its start value immediately
    pub fn from_to<F>(&mut self, tween: Tween, mut apply: F)
    where
        F: FnMut(f32) + 'static,
    {
        apply(tween.from);
        self.to(tween, apply);
    }

    /// Schedule a tween; nothing is applied until its delay has passed
    pub fn to<F>(&mut self, tween: Tween, apply: F)
    where
        F: FnMut(f32) + 'static,
    {
        self.tracks.push(Track {
            scheduled_at: self.now,
            tween,
            apply: Box::new(apply),
        });
    }

    /// Run `call` once, `delay` after now
    pub fn call_after<F>(&mut self, delay: f32, call: F)
    where
        F: FnOnce() + 'static,
    {
        self.calls.push(DelayedCall {
            due: self.now + f64::from(delay),
            call: Box::new(call),
        });
    }

    /// Move time forward and sample everything that is due
    ///
    /// Started tweens apply their current value, finished ones apply their end
    /// value once and are dropped. Due calls then run in scheduling order.
    pub fn advance(&mut self, delta: f32) {
        self.now += f64::from(delta);
        let now = self.now;

        self.tracks.retain_mut(|track| {
            let elapsed = (now - track.scheduled_at) as f32;
            if elapsed <= track.tween.delay {
                return true;
            }
            (track.apply)(track.tween.value_at(elapsed));
            elapsed < track.tween.end_time()
        });

        let (due, pending): (Vec<_>, Vec<_>) =
            self.calls.drain(..).partition(|call| call.due <= now);
        self.calls = pending;
        for call in due {
            (call.call)();
        }
    }

    /// Time accumulated by [`Timeline::advance`]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Tweens and calls still waiting to finish
    pub fn pending(&self) -> usize {
        self.tracks.len() + self.calls.len()
    }

    /// True when nothing is scheduled
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    #[test]
    fn test_ease_endpoints() {
        for ease in [Ease::Linear, Ease::QuadOut, Ease::CubicIn] {
            assert_relative_eq!(ease.apply(0.0), 0.0);
            assert_relative_eq!(ease.apply(1.0), 1.0);
        }
        assert_relative_eq!(Ease::QuadOut.apply(0.5), 0.75);
        assert_relative_eq!(Ease::CubicIn.apply(0.5), 0.125);
    }

    #[test]
    fn test_tween_is_pure_function_of_time() {
        let tween = Tween::new(0.0, 0.5, 3.0).with_delay(0.5).with_ease(Ease::Linear);

        assert_relative_eq!(tween.value_at(0.0), 0.0);
        assert_relative_eq!(tween.value_at(0.5), 0.0);
        assert_relative_eq!(tween.value_at(2.0), 0.25);
        assert_relative_eq!(tween.value_at(3.5), 0.5);
        assert_relative_eq!(tween.value_at(10.0), 0.5);
        assert_relative_eq!(tween.end_time(), 3.5);
    }

    #[test]
    fn test_zero_duration_jumps_after_delay() {
        let tween = Tween::new(1.0, 0.0, 0.0).with_delay(0.25);
        assert_relative_eq!(tween.value_at(0.2), 1.0);
        assert_relative_eq!(tween.value_at(0.3), 0.0);
    }

    #[test]
    fn test_param_clones_share_value() {
        let opacity = Param::new(1.0);
        let mut set = opacity.setter();
        set(0.25);
        assert_relative_eq!(opacity.clone().get(), 0.25);
        assert!(opacity.ptr_eq(&opacity.clone()));
        assert!(!opacity.ptr_eq(&Param::new(0.25)));
    }

    #[test]
    fn test_from_to_applies_start_immediately() {
        let value = Param::new(-1.0);
        let mut timeline = Timeline::new();

        timeline.from_to(Tween::new(0.0, 1.0, 1.0).with_delay(0.5), value.setter());
        assert_relative_eq!(value.get(), 0.0);

        timeline.advance(0.25);
        assert_relative_eq!(value.get(), 0.0);

        timeline.advance(1.5);
        assert_relative_eq!(value.get(), 1.0);
        assert!(timeline.is_idle());
    }

    #[test]
    fn test_to_waits_for_its_delay() {
        let value = Param::new(9.0);
        let mut timeline = Timeline::new();

        timeline.to(Tween::new(1.0, 0.0, 0.5).with_delay(0.5), value.setter());
        timeline.advance(0.5);
        assert_relative_eq!(value.get(), 9.0);

        timeline.advance(0.25);
        assert!(value.get() < 1.0 && value.get() > 0.0);
    }

    #[test]
    fn test_calls_fire_once_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut timeline = Timeline::new();
        for (delay, name) in [(0.4, "reveal"), (0.3, "wake"), (0.4, "touch")] {
            let log = Rc::clone(&log);
            timeline.call_after(delay, move || log.borrow_mut().push(name));
        }

        timeline.advance(0.125);
        assert!(log.borrow().is_empty());
        timeline.advance(0.25);
        assert_eq!(*log.borrow(), vec!["wake"]);
        timeline.advance(0.125);
        timeline.advance(1.0);
        assert_eq!(*log.borrow(), vec!["wake", "reveal", "touch"]);
        assert!(timeline.is_idle());
    }

    #[test]
    fn test_scheduling_is_relative_to_now() {
        let value = Param::default();
        let mut timeline = Timeline::new();

        timeline.advance(10.0);
        timeline.to(Tween::new(0.0, 1.0, 1.0).with_ease(Ease::Linear), value.setter());
        timeline.advance(0.5);

        assert_relative_eq!(value.get(), 0.5);
        assert_relative_eq!(timeline.now(), 10.5);
    }
}
