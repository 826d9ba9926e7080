//! Frame timer
//!
//! A shared clock that animation drivers subscribe to. The host advances it
//! once per frame; drivers then read their linear progress from it.
//!
//! One timer is usually shared by every animated element under a chart so that
//! a props change can bypass all in-flight animations at once.

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

new_key_type! {
    pub struct SubscriptionId;
}

/// Shared handle to a [`Timer`]
pub type TimerHandle = Rc<RefCell<Timer>>;

#[derive(Clone, Copy, Debug)]
struct Subscription {
    start_ms: f64,
    duration_ms: f32,
    delay_ms: f32,
}

/// Clock shared by animation drivers
#[derive(Debug)]
pub struct Timer {
    subscriptions: SlotMap<SubscriptionId, Subscription>,
    now_ms: f64,
    last_tick: Option<Instant>,
    running: bool,
    should_animate: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            subscriptions: SlotMap::with_key(),
            now_ms: 0.0,
            last_tick: None,
            running: false,
            should_animate: true,
        }
    }

    /// Create a timer behind a shareable handle
    pub fn shared() -> TimerHandle {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Register a subscription starting now.
    ///
    /// While animation is bypassed the subscription gets zero duration and
    /// delay, so its first progress read is already complete.
    pub fn subscribe(&mut self, duration_ms: f32, delay_ms: f32) -> SubscriptionId {
        let (duration_ms, delay_ms) = if self.should_animate {
            (duration_ms.max(0.0), delay_ms.max(0.0))
        } else {
            (0.0, 0.0)
        };
        let id = self.subscriptions.insert(Subscription {
            start_ms: self.now_ms,
            duration_ms,
            delay_ms,
        });
        tracing::trace!(?id, duration_ms, delay_ms, "timer subscription");
        self.start();
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.remove(id);
        if self.subscriptions.is_empty() {
            self.running = false;
            self.last_tick = None;
        }
    }

    /// Linear progress of a subscription in `[0, 1]`, measured after its delay.
    ///
    /// Returns `None` for unknown subscriptions, including every subscription
    /// dropped by [`Timer::stop`].
    pub fn progress(&self, id: SubscriptionId) -> Option<f32> {
        let sub = self.subscriptions.get(id)?;
        let elapsed = (self.now_ms - sub.start_ms) as f32 - sub.delay_ms;
        if elapsed < 0.0 {
            return Some(0.0);
        }
        if sub.duration_ms <= 0.0 {
            return Some(1.0);
        }
        Some((elapsed / sub.duration_ms).min(1.0))
    }

    /// Advance the clock by `dt_ms` milliseconds
    pub fn advance(&mut self, dt_ms: f32) {
        if !self.running {
            return;
        }
        self.now_ms += f64::from(dt_ms.max(0.0));
    }

    /// Advance the clock by the wall time since the previous tick
    pub fn tick(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_tick {
            let dt = (now - last).as_secs_f32() * 1000.0;
            self.advance(dt);
        }
        self.last_tick = Some(now);
    }

    fn start(&mut self) {
        self.running = true;
    }

    /// Stop the clock and discard every pending subscription
    pub fn stop(&mut self) {
        if !self.subscriptions.is_empty() {
            tracing::debug!(
                pending = self.subscriptions.len(),
                "timer stopped with pending subscriptions"
            );
        }
        self.subscriptions.clear();
        self.running = false;
        self.last_tick = None;
    }

    /// Make new subscriptions complete immediately until resumed
    pub fn bypass_animation(&mut self) {
        self.should_animate = false;
    }

    pub fn resume_animation(&mut self) {
        self.should_animate = true;
    }

    pub fn should_animate(&self) -> bool {
        self.should_animate
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of live subscriptions
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Milliseconds elapsed on this clock
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_tracks_duration_after_delay() {
        let mut timer = Timer::new();
        let id = timer.subscribe(100.0, 50.0);

        timer.advance(25.0);
        assert_eq!(timer.progress(id), Some(0.0));

        timer.advance(75.0);
        assert_eq!(timer.progress(id), Some(0.5));

        timer.advance(500.0);
        assert_eq!(timer.progress(id), Some(1.0));
    }

    #[test]
    fn bypassed_subscriptions_complete_immediately() {
        let mut timer = Timer::new();
        timer.bypass_animation();
        let id = timer.subscribe(1000.0, 200.0);
        assert_eq!(timer.progress(id), Some(1.0));

        timer.resume_animation();
        let next = timer.subscribe(1000.0, 0.0);
        assert_eq!(timer.progress(next), Some(0.0));
    }

    #[test]
    fn stop_discards_subscriptions() {
        let mut timer = Timer::new();
        let id = timer.subscribe(100.0, 0.0);
        timer.stop();

        assert!(!timer.is_running());
        assert_eq!(timer.progress(id), None);
        assert_eq!(timer.subscription_count(), 0);

        timer.advance(10.0);
        assert_eq!(timer.now_ms(), 0.0);
    }

    #[test]
    fn last_unsubscribe_stops_the_clock() {
        let mut timer = Timer::new();
        let a = timer.subscribe(100.0, 0.0);
        let b = timer.subscribe(100.0, 0.0);
        timer.unsubscribe(a);
        assert!(timer.is_running());
        timer.unsubscribe(b);
        assert!(!timer.is_running());
    }
}
