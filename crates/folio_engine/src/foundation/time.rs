//! Time management utilities
//!
//! [`Clock`] is the per-frame tick source every subsystem subscribes to.
//! [`Timer`] measures real frame deltas for the host loop that drives the clock.

use crate::events::{Event, EventEmitter, SubscriptionId};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Payload delivered to tick handlers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Time since the previous tick in seconds
    pub delta: f32,
    /// Total clock time after this tick
    pub elapsed: f64,
    /// Tick counter, starting at 1 for the first tick
    pub frame: u64,
}

/// Tick event kind (the clock emits a single kind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    /// Per-frame tick
    Tick,
}

impl Event for Tick {
    type Kind = TickKind;

    fn kind(&self) -> TickKind {
        TickKind::Tick
    }
}

/// Subscription handle returned by [`Clock::on_tick`]
pub type TickSubscription = SubscriptionId;

struct ClockState {
    emitter: EventEmitter<Tick>,
    elapsed: Cell<f64>,
    frame: Cell<u64>,
}

/// Shared per-frame tick source
///
/// Cloning yields another handle to the same clock. Handlers run in
/// subscription order, once per tick; a handler registered during a tick first
/// runs on the following tick.
#[derive(Clone)]
pub struct Clock {
    state: Rc<ClockState>,
}

impl Clock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self {
            state: Rc::new(ClockState {
                emitter: EventEmitter::new(),
                elapsed: Cell::new(0.0),
                frame: Cell::new(0),
            }),
        }
    }

    /// Subscribe to every subsequent tick
    pub fn on_tick<F>(&self, handler: F) -> TickSubscription
    where
        F: FnMut(&Tick) + 'static,
    {
        self.state.emitter.on(TickKind::Tick, handler)
    }

    /// Unsubscribe a tick handler, returns false if it was not registered
    pub fn off_tick(&self, subscription: TickSubscription) -> bool {
        self.state.emitter.off(subscription)
    }

    /// Advance the clock by one frame and notify every subscriber
    pub fn tick(&self, delta: f32) -> Tick {
        let elapsed = self.state.elapsed.get() + f64::from(delta);
        let frame = self.state.frame.get() + 1;
        self.state.elapsed.set(elapsed);
        self.state.frame.set(frame);

        let tick = Tick { delta, elapsed, frame };
        self.state.emitter.emit(&tick);
        tick
    }

    /// Tick repeatedly with a fixed step until `duration` has elapsed
    ///
    /// The last step is shortened so the clock lands exactly on the target.
    /// Returns the number of ticks issued.
    pub fn advance(&self, duration: f32, step: f32) -> u64 {
        let mut remaining = duration;
        let mut ticks = 0;
        while remaining > 0.0 {
            let delta = step.min(remaining);
            self.tick(delta);
            remaining -= delta;
            ticks += 1;
        }
        ticks
    }

    /// Total time accumulated by [`Clock::tick`]
    pub fn elapsed(&self) -> f64 {
        self.state.elapsed.get()
    }

    /// Number of ticks issued so far
    pub fn frame(&self) -> u64 {
        self.state.frame.get()
    }

    /// Number of live tick subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.state.emitter.subscriber_count(TickKind::Tick)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
