//! Fixed-timestep update loop.
//!
//! Rendering runs as fast as the caller drives it; simulation state,
//! including animation frame stepping, advances at a fixed rate through an
//! accumulator so playback speed is independent of the frame rate.

use std::time::{Duration, Instant};

use log::trace;

/// Simulation updates per second.
pub const TARGET_UPS: f32 = 30.0;

/// Timer for tracking frame timing and elapsed time.
pub struct Timer {
    start_time: Instant,
    last_update: Instant,
    /// Time since last tick
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Creates a new timer starting from now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Updates the timer (called once per rendered frame).
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_update;
        self.elapsed = now - self.start_time;
        self.last_update = now;
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// Accumulator that converts variable frame deltas into fixed update steps.
///
/// Feed it the per-frame delta and run one simulation step for every `true`
/// it returns. A slow frame yields several steps, a fast one none.
#[derive(Debug, Clone)]
pub struct FrameAdvanceGate {
    interval: f32,
    accumulated: f32,
}

impl Default for FrameAdvanceGate {
    fn default() -> Self {
        Self::new(TARGET_UPS)
    }
}

impl FrameAdvanceGate {
    #[must_use]
    pub fn new(updates_per_second: f32) -> Self {
        Self {
            interval: 1.0 / updates_per_second,
            accumulated: 0.0,
        }
    }

    pub fn accumulate(&mut self, delta_seconds: f32) {
        self.accumulated += delta_seconds;
    }

    /// Consumes one update interval if enough time has accumulated.
    pub fn try_advance(&mut self) -> bool {
        if self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn interval(&self) -> f32 {
        self.interval
    }
}

/// Drives the timer and gate together: ticks once per rendered frame and
/// reports how many fixed updates to run.
pub struct UpdateLoop {
    timer: Timer,
    gate: FrameAdvanceGate,
}

impl Default for UpdateLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateLoop {
    #[must_use]
    pub fn new() -> Self {
        Self {
            timer: Timer::new(),
            gate: FrameAdvanceGate::default(),
        }
    }

    /// Advances the clock for one rendered frame and returns the number of
    /// fixed simulation steps owed.
    pub fn frame(&mut self) -> u32 {
        self.timer.tick();
        self.gate.accumulate(self.timer.dt_seconds());
        let mut steps = 0;
        while self.gate.try_advance() {
            steps += 1;
        }
        if steps > 1 {
            trace!("catching up: {steps} fixed steps in one frame");
        }
        steps
    }

    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_owes_no_step_before_interval_elapses() {
        let mut gate = FrameAdvanceGate::new(30.0);
        gate.accumulate(0.01);
        assert!(!gate.try_advance());
        gate.accumulate(0.03);
        assert!(gate.try_advance());
        assert!(!gate.try_advance());
    }

    #[test]
    fn slow_frame_yields_multiple_steps() {
        let mut gate = FrameAdvanceGate::new(30.0);
        // Comfortably past three 1/30s intervals so f32 rounding cannot
        // leave the accumulator a hair short of the third step.
        gate.accumulate(0.11);
        let mut steps = 0;
        while gate.try_advance() {
            steps += 1;
        }
        assert_eq!(steps, 3);
    }

    #[test]
    fn leftover_time_carries_into_the_next_frame() {
        let mut gate = FrameAdvanceGate::new(10.0);
        gate.accumulate(0.15);
        assert!(gate.try_advance());
        assert!(!gate.try_advance());
        gate.accumulate(0.05);
        assert!(gate.try_advance());
    }
}
