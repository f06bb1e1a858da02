//! Simulation time.
//!
//! Time is an explicit value passed into every tick. Nothing in the
//! workspace reads a global counter.

use crate::fixed::{TICKS_PER_SECOND, Ticks};
use serde::{Deserialize, Serialize};

/// The driver's tick counter. Advances by one per simulation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimClock {
    tick: Ticks,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(tick: Ticks) -> Self {
        Self { tick }
    }

    pub fn tick(&self) -> Ticks {
        self.tick
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// Whole seconds elapsed since tick 0.
    pub fn seconds(&self) -> u64 {
        self.tick / TICKS_PER_SECOND
    }

    pub fn elapsed_since(&self, earlier: Ticks) -> Ticks {
        self.tick.saturating_sub(earlier)
    }
}

/// A cooldown that opens once every `interval` ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickGate {
    next: Ticks,
}

impl TickGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True at most once per `interval` ticks. The first call is always
    /// ready.
    pub fn ready(&mut self, clock: &SimClock, interval: Ticks) -> bool {
        if clock.tick() < self.next {
            return false;
        }
        self.next = clock.tick().saturating_add(interval.max(1));
        true
    }
}
