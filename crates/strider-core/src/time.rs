//! Fixed-timestep simulation clock.
//!
//! [`SimTime`] tracks elapsed simulation time as an integer nanosecond count
//! to avoid floating-point accumulation drift. [`Clock`] layers the
//! fix-your-timestep pattern on top: feed it wall-clock deltas, then drain
//! fixed-size steps, capped per frame to avoid the spiral of death.
//!
//! The controllers never read this ambiently; demo loops drive the clock and
//! pass the resulting `dt` down explicitly.

use std::fmt;
use std::time::Duration;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Integer-nanosecond simulation clock value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
    Resource,
)]
pub struct SimTime {
    nanos: u64,
}

impl SimTime {
    /// Zero time.
    #[must_use]
    pub const fn new() -> Self {
        Self { nanos: 0 }
    }

    /// From seconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_secs(secs: f64) -> Self {
        Self {
            nanos: (secs * 1e9) as u64,
        }
    }

    /// Raw nanosecond count.
    #[must_use]
    pub const fn nanos(&self) -> u64 {
        self.nanos
    }

    /// Elapsed seconds as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn secs_f64(&self) -> f64 {
        self.nanos as f64 / 1e9
    }

    /// Advance by `delta_secs` seconds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn advance_secs(&mut self, delta_secs: f64) {
        self.nanos = self.nanos.saturating_add((delta_secs * 1e9) as u64);
    }

    /// Reset to zero.
    pub fn reset(&mut self) {
        self.nanos = 0;
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.nanos / 1_000_000_000;
        let millis = (self.nanos % 1_000_000_000) / 1_000_000;
        write!(f, "{secs}.{millis:03}s")
    }
}

/// Fixed-timestep clock: accumulates real deltas, dispenses fixed steps.
#[derive(Debug, Clone)]
pub struct Clock {
    time: SimTime,
    accumulated: u64,
    timestep_nanos: u64,
    timestep_secs: f64,
    max_steps: u32,
    steps_this_frame: u32,
}

impl Clock {
    /// Create a clock with the given fixed timestep in seconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(timestep_secs: f64) -> Self {
        Self {
            time: SimTime::new(),
            accumulated: 0,
            timestep_nanos: (timestep_secs * 1e9) as u64,
            timestep_secs,
            max_steps: 10,
            steps_this_frame: 0,
        }
    }

    /// Cap the number of simulation steps dispensed per frame.
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Feed a real-world frame delta and reset the per-frame step counter.
    #[allow(clippy::cast_possible_truncation)]
    pub fn tick(&mut self, delta: Duration) {
        self.accumulated = self.accumulated.saturating_add(delta.as_nanos() as u64);
        self.steps_this_frame = 0;
    }

    /// `true` if a fixed step should be taken. Each `true` consumes one
    /// timestep and advances the simulation time.
    pub fn should_step(&mut self) -> bool {
        if self.steps_this_frame >= self.max_steps {
            return false;
        }
        if self.accumulated >= self.timestep_nanos {
            self.accumulated -= self.timestep_nanos;
            self.steps_this_frame += 1;
            self.time.nanos = self.time.nanos.saturating_add(self.timestep_nanos);
            return true;
        }
        false
    }

    /// Current simulation time.
    #[must_use]
    pub const fn time(&self) -> SimTime {
        self.time
    }

    /// The fixed timestep in seconds.
    #[must_use]
    pub const fn timestep(&self) -> f64 {
        self.timestep_secs
    }

    /// Interpolation alpha in `[0, 1)` for visual smoothing.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn alpha(&self) -> f32 {
        if self.timestep_nanos == 0 {
            return 0.0;
        }
        self.accumulated as f32 / self.timestep_nanos as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simtime_from_secs() {
        let t = SimTime::from_secs(1.5);
        assert_eq!(t.nanos(), 1_500_000_000);
        assert!((t.secs_f64() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn simtime_advance_and_reset() {
        let mut t = SimTime::new();
        t.advance_secs(0.25);
        t.advance_secs(0.25);
        assert_eq!(t.nanos(), 500_000_000);
        t.reset();
        assert_eq!(t.nanos(), 0);
    }

    #[test]
    fn simtime_display() {
        assert_eq!(SimTime::from_secs(1.234).to_string(), "1.234s");
        assert_eq!(SimTime::new().to_string(), "0.000s");
    }

    #[test]
    fn clock_dispenses_whole_steps() {
        let mut clock = Clock::new(0.01);
        clock.tick(Duration::from_millis(35));
        let mut steps = 0;
        while clock.should_step() {
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert_eq!(clock.time().nanos(), 30_000_000);
    }

    #[test]
    fn clock_caps_steps_per_frame() {
        let mut clock = Clock::new(0.001).with_max_steps(4);
        clock.tick(Duration::from_millis(100));
        let mut steps = 0;
        while clock.should_step() {
            steps += 1;
        }
        assert_eq!(steps, 4);
    }

    #[test]
    fn clock_alpha_reflects_leftover() {
        let mut clock = Clock::new(0.01);
        clock.tick(Duration::from_millis(15));
        while clock.should_step() {}
        assert!((clock.alpha() - 0.5).abs() < 0.01);
    }

    #[test]
    fn clock_carries_remainder_across_frames() {
        let mut clock = Clock::new(0.01);
        clock.tick(Duration::from_millis(6));
        assert!(!clock.should_step());
        clock.tick(Duration::from_millis(6));
        assert!(clock.should_step());
        assert!(!clock.should_step());
    }
}
