//! Drives the engine at a fixed cadence (live play) or in a tight
//! unthrottled loop (skip-ahead).
//!
//! Acceleration is always "more steps per unit wall-clock time", never
//! "bigger steps": every call into [`crate::engine::JarEngine::advance_simulation`]
//! uses the same fixed tick duration, which is what makes skip-ahead
//! reproduce the live trajectory exactly. The play-speed multiplier scales
//! the wall-clock accumulator, not the step size, and a multiplier of zero
//! pauses (and drops accumulated time so resuming does not burst).

use crate::engine::JarEngine;
use crate::fixed::Fixed64;

/// Smallest accepted tick duration; shorter configurations are clamped.
const MIN_TICK: f64 = 1e-3;

// ---------------------------------------------------------------------------
// Skip report
// ---------------------------------------------------------------------------

/// Result of a skip-ahead run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipReport {
    /// Steps committed during the skip.
    pub steps_run: u64,
    /// Simulated time covered (steps * tick duration).
    pub simulated: Fixed64,
    /// True if the caller's predicate stopped the loop early.
    pub cancelled: bool,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Converts wall-clock frames and skip requests into whole fixed ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scheduler {
    tick_duration: Fixed64,
    /// Ticks simulated per wall-clock second per unit tick: 0 pauses,
    /// 1 is real time, 2/4/8 are the fast-forward gears.
    speed: u32,
    /// Wall-clock time (already speed-scaled) not yet consumed by a tick.
    accumulator: Fixed64,
}

impl Scheduler {
    /// Create a scheduler with the given fixed tick duration at speed 1.
    pub fn new(tick_duration: Fixed64) -> Self {
        Self {
            tick_duration: tick_duration.max(Fixed64::from_num(MIN_TICK)),
            speed: 1,
            accumulator: Fixed64::ZERO,
        }
    }

    pub fn tick_duration(&self) -> Fixed64 {
        self.tick_duration
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Set the play-speed multiplier. Zero pauses and clears any pending
    /// wall-clock remainder.
    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed;
        if speed == 0 {
            self.accumulator = Fixed64::ZERO;
        }
    }

    // -----------------------------------------------------------------------
    // Live cadence
    // -----------------------------------------------------------------------

    /// Feed one wall-clock frame of `wall_dt` seconds and run however many
    /// whole fixed ticks now fit. Returns the number of steps committed.
    ///
    /// Runs nothing while the jar is unsealed or the speed is zero; in
    /// both cases pending time is dropped, not banked.
    pub fn on_frame(&mut self, engine: &mut JarEngine, wall_dt: Fixed64) -> u64 {
        if !engine.is_simulation_phase() || self.speed == 0 {
            self.accumulator = Fixed64::ZERO;
            return 0;
        }
        if wall_dt > Fixed64::ZERO {
            self.accumulator += wall_dt * Fixed64::from_num(self.speed);
        }

        let mut steps = 0;
        while self.accumulator >= self.tick_duration {
            self.accumulator -= self.tick_duration;
            steps += engine.advance_simulation(self.tick_duration).steps_run;
        }
        steps
    }

    // -----------------------------------------------------------------------
    // Skip-ahead
    // -----------------------------------------------------------------------

    /// Simulate `span` seconds in a tight loop of fixed ticks with no
    /// rendering between steps. Same step function and tick duration as
    /// live play; never a faster approximate path.
    pub fn skip_ahead(&mut self, engine: &mut JarEngine, span: Fixed64) -> SkipReport {
        self.skip_ahead_while(engine, span, |_| true)
    }

    /// Skip-ahead with a cancellation predicate, checked between steps.
    /// Each step fully commits before the next begins, so aborting
    /// mid-loop cannot leave partial state behind.
    pub fn skip_ahead_while(
        &mut self,
        engine: &mut JarEngine,
        span: Fixed64,
        mut keep_going: impl FnMut(&JarEngine) -> bool,
    ) -> SkipReport {
        let mut report = SkipReport {
            steps_run: 0,
            simulated: Fixed64::ZERO,
            cancelled: false,
        };
        if !engine.is_simulation_phase() {
            return report;
        }

        while report.simulated < span {
            if !keep_going(engine) {
                report.cancelled = true;
                break;
            }
            let result = engine.advance_simulation(self.tick_duration);
            if result.steps_run == 0 {
                break;
            }
            report.steps_run += result.steps_run;
            report.simulated += self.tick_duration;
        }
        report
    }
}

// ===========================================================================
// Tests
// ===========================================================================
