//! Animation driver
//!
//! Interpolates a [`PropMap`] towards a queue of targets, one segment at a
//! time, reading progress from a shared [`Timer`].

use std::collections::VecDeque;

use crate::easing::Easing;
use crate::interpolate::interpolate_props;
use crate::timer::{SubscriptionId, Timer};
use crate::value::PropMap;

/// Duration used when an animation config does not name one
pub const DEFAULT_DURATION_MS: f32 = 1000.0;

/// Timing for the segments of an [`AnimationDriver`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationConfig {
    pub duration_ms: f32,
    pub delay_ms: f32,
    pub easing: Easing,
}

impl AnimationConfig {
    pub fn new(duration_ms: f32) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    /// Segments complete on the first frame
    pub fn immediate() -> Self {
        Self {
            duration_ms: 0.0,
            delay_ms: 0.0,
            easing: Easing::Linear,
        }
    }

    pub fn with_delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            delay_ms: 0.0,
            easing: Easing::EaseInOutQuad,
        }
    }
}

/// Progress report for the frame most recently produced
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationInfo {
    /// Linear progress of the active segment
    pub progress: f32,
    pub animating: bool,
    /// The last step finished a segment
    pub terminating: bool,
}

#[derive(Debug)]
struct Segment {
    from: PropMap,
    subscription: SubscriptionId,
}

/// Drives a prop map through queued targets
#[derive(Debug)]
pub struct AnimationDriver {
    config: AnimationConfig,
    data: PropMap,
    queue: VecDeque<PropMap>,
    active: Option<Segment>,
    info: AnimationInfo,
}

impl AnimationDriver {
    /// Create a driver showing `data`, with `data` queued as its first target.
    pub fn new(config: AnimationConfig, data: PropMap) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(data.clone());
        Self {
            config,
            data,
            queue,
            active: None,
            info: AnimationInfo {
                progress: 1.0,
                animating: false,
                terminating: false,
            },
        }
    }

    /// Queue a new target and restart the head segment.
    ///
    /// The head segment is re-subscribed against `timer`, so a bypassed timer
    /// snaps an interrupted segment to its target on the next step. An idle
    /// driver updated while bypassed starts its segment on the next step
    /// instead.
    pub fn update(&mut self, config: AnimationConfig, data: PropMap, timer: &mut Timer) {
        self.config = config;
        self.queue.push_back(data);
        if self.active.is_some() || timer.should_animate() {
            self.restart(timer);
        }
    }

    fn restart(&mut self, timer: &mut Timer) {
        if let Some(segment) = self.active.take() {
            timer.unsubscribe(segment.subscription);
        }
        if self.queue.is_empty() {
            return;
        }
        let subscription = timer.subscribe(self.config.duration_ms, self.config.delay_ms);
        self.active = Some(Segment {
            from: self.data.clone(),
            subscription,
        });
    }

    /// Advance by one frame.
    ///
    /// Returns `true` when the last queued target was reached during this step.
    pub fn step(&mut self, timer: &mut Timer) -> bool {
        self.info.terminating = false;
        if self.active.is_none() {
            if self.queue.is_empty() {
                return false;
            }
            self.restart(timer);
        }

        loop {
            let Some(segment) = self.active.as_ref() else {
                return false;
            };
            let Some(target) = self.queue.front() else {
                return false;
            };
            let progress = if segment.from == *target {
                Some(1.0)
            } else {
                timer.progress(segment.subscription)
            };
            let Some(progress) = progress else {
                // Timer was stopped underneath us.
                self.active = None;
                self.info.animating = false;
                return false;
            };

            if progress < 1.0 {
                let eased = self.config.easing.apply(progress);
                self.data = interpolate_props(&segment.from, target, eased);
                self.info = AnimationInfo {
                    progress,
                    animating: true,
                    terminating: false,
                };
                return false;
            }

            if let Some(segment) = self.active.take() {
                timer.unsubscribe(segment.subscription);
            }
            if let Some(target) = self.queue.pop_front() {
                self.data = target;
            }
            self.info = AnimationInfo {
                progress: 1.0,
                animating: false,
                terminating: true,
            };
            if self.queue.is_empty() {
                return true;
            }
            self.restart(timer);
        }
    }

    /// Props for the current frame
    pub fn data(&self) -> &PropMap {
        &self.data
    }

    pub fn info(&self) -> AnimationInfo {
        self.info
    }

    pub fn config(&self) -> AnimationConfig {
        self.config
    }

    /// Whether targets remain to be reached
    pub fn is_pending(&self) -> bool {
        !self.queue.is_empty()
    }
}
