// src/cooldown.rs - Per-gesture debounce timers
use std::ops::Index;
use std::time::{Duration, Instant};

use crate::gesture::{Gesture, GESTURE_COUNT};

/// Whether a gesture may fire right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownPhase {
    Armed,
    Cooling,
}

/// Minimum-interval gate for one gesture.
///
/// Readiness is recomputed from `now` on every query; nothing ticks in the
/// background.
#[derive(Debug, Clone)]
pub struct Cooldown {
    minimum_interval: Duration,
    last_fired_at: Option<Instant>,
}

impl Cooldown {
    pub fn new(minimum_interval: Duration) -> Self {
        Self {
            minimum_interval,
            last_fired_at: None,
        }
    }

    pub fn minimum_interval(&self) -> Duration {
        self.minimum_interval
    }

    pub fn last_fired_at(&self) -> Option<Instant> {
        self.last_fired_at
    }

    /// True if never fired, or if strictly more than the minimum interval has
    /// passed since the last dispatch.
    pub fn ready(&self, now: Instant) -> bool {
        match self.last_fired_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.minimum_interval,
        }
    }

    /// Record a successful dispatch at `now`.
    ///
    /// `last_fired_at` never moves backwards, even if a caller hands in an
    /// older instant.
    pub fn trigger(&mut self, now: Instant) {
        self.last_fired_at = Some(match self.last_fired_at {
            Some(last) if last > now => last,
            _ => now,
        });
    }

    pub fn phase(&self, now: Instant) -> CooldownPhase {
        if self.ready(now) {
            CooldownPhase::Armed
        } else {
            CooldownPhase::Cooling
        }
    }

    /// Time left until the gate re-arms; zero when already armed.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_fired_at {
            None => Duration::ZERO,
            Some(last) => self
                .minimum_interval
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }
}

/// One cooldown per gesture, indexed by the gesture itself.
#[derive(Debug, Clone)]
pub struct CooldownTable {
    cooldowns: [Cooldown; GESTURE_COUNT],
}

impl CooldownTable {
    /// Build from per-gesture intervals given in [`Gesture::ALL`] order.
    pub fn new(intervals: [Duration; GESTURE_COUNT]) -> Self {
        Self {
            cooldowns: intervals.map(Cooldown::new),
        }
    }

    pub fn get(&self, gesture: Gesture) -> &Cooldown {
        &self.cooldowns[gesture.index()]
    }

    pub fn ready(&self, gesture: Gesture, now: Instant) -> bool {
        self.get(gesture).ready(now)
    }

    pub fn trigger(&mut self, gesture: Gesture, now: Instant) {
        self.cooldowns[gesture.index()].trigger(now);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Gesture, &Cooldown)> {
        Gesture::ALL.into_iter().zip(self.cooldowns.iter())
    }
}

impl Index<Gesture> for CooldownTable {
    type Output = Cooldown;

    fn index(&self, gesture: Gesture) -> &Cooldown {
        self.get(gesture)
    }
}
