//! Mode policies for the workout timer.
//!
//! Each workout mode is a small policy over the shared [`TimerState`]:
//!
//! ```text
//! Countdown   remaining -= 1 ──▶ ≤ 0 ──▶ Complete
//! Stopwatch   remaining += 1 (never completes)
//! Rounds      remaining -= 1 ──▶ ≤ 0 ──▶ next round ──▶ ... ──▶ Complete
//! Cycle       WORK 20s ──▶ REST 10s ──▶ WORK ... (8 cycles) ──▶ Complete
//! ```
//!
//! Policies are stateless; everything they touch lives in the state or is
//! read from the live configuration at the moment it is needed.

use crate::config::WorkoutConfig;
use crate::types::{
    TimerState, WorkoutMode, CYCLE_REST_SECONDS, CYCLE_TOTAL, CYCLE_WORK_SECONDS,
};

/// What a single tick did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time advanced, nothing else changed
    Continue,
    /// A new round began
    RoundStarted {
        /// Round now running
        round: u32,
        /// Total rounds as re-read at the boundary
        total: u32,
    },
    /// The cycle flipped between work and rest
    PhaseChanged {
        /// True when the new phase is work
        work: bool,
        /// Cycle now running
        cycle: u32,
    },
    /// The workout reached its terminal state
    Complete,
}

/// Transition policy for one workout mode.
pub trait ModePolicy: Sync {
    /// Returns true if the state sits at this mode's fresh-idle baseline.
    fn is_fresh(&self, state: &TimerState) -> bool;

    /// Initializes counters from the configuration.
    fn on_fresh_start(&self, state: &mut TimerState, config: &WorkoutConfig);

    /// Lets ticking continue from the current values.
    fn on_resume(&self, _state: &mut TimerState) {}

    /// Advances one second.
    fn on_tick(&self, state: &mut TimerState, config: &WorkoutConfig) -> TickOutcome;

    /// Restores the mode's idle baseline.
    fn on_reset(&self, state: &mut TimerState, config: &WorkoutConfig);
}

impl WorkoutMode {
    /// Returns the policy implementing this mode.
    pub fn policy(&self) -> &'static dyn ModePolicy {
        match self {
            WorkoutMode::Countdown => &CountdownPolicy,
            WorkoutMode::Stopwatch => &StopwatchPolicy,
            WorkoutMode::Rounds => &RoundsPolicy,
            WorkoutMode::Cycle => &CyclePolicy,
        }
    }
}

// ============================================================================
// Countdown
// ============================================================================

/// Counts down from the configured minutes to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountdownPolicy;

impl ModePolicy for CountdownPolicy {
    fn is_fresh(&self, state: &TimerState) -> bool {
        state.remaining_seconds == state.baseline_seconds
    }

    fn on_fresh_start(&self, state: &mut TimerState, config: &WorkoutConfig) {
        state.baseline_seconds = config.countdown_seconds();
        state.remaining_seconds = state.baseline_seconds;
    }

    fn on_tick(&self, state: &mut TimerState, _config: &WorkoutConfig) -> TickOutcome {
        state.remaining_seconds -= 1;
        if state.remaining_seconds <= 0 {
            state.remaining_seconds = 0;
            return TickOutcome::Complete;
        }
        TickOutcome::Continue
    }

    fn on_reset(&self, state: &mut TimerState, _config: &WorkoutConfig) {
        // The last fresh-start baseline, not the current input.
        state.remaining_seconds = state.baseline_seconds;
    }
}

// ============================================================================
// Stopwatch
// ============================================================================

/// Counts up from zero; `remaining_seconds` holds the elapsed time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopwatchPolicy;

impl ModePolicy for StopwatchPolicy {
    fn is_fresh(&self, state: &TimerState) -> bool {
        state.remaining_seconds == 0
    }

    fn on_fresh_start(&self, state: &mut TimerState, _config: &WorkoutConfig) {
        state.remaining_seconds = 0;
    }

    fn on_tick(&self, state: &mut TimerState, _config: &WorkoutConfig) -> TickOutcome {
        state.remaining_seconds += 1;
        TickOutcome::Continue
    }

    fn on_reset(&self, state: &mut TimerState, _config: &WorkoutConfig) {
        state.remaining_seconds = 0;
    }
}

// ============================================================================
// Rounds
// ============================================================================

/// Fixed-length rounds; round length and count are re-read at every boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundsPolicy;

impl ModePolicy for RoundsPolicy {
    fn is_fresh(&self, state: &TimerState) -> bool {
        // Against the length the round started with, not the live input.
        state.current_round == 1 && state.remaining_seconds == state.round_length_seconds
    }

    fn on_fresh_start(&self, state: &mut TimerState, config: &WorkoutConfig) {
        Self::first_round(state, config);
    }

    fn on_tick(&self, state: &mut TimerState, config: &WorkoutConfig) -> TickOutcome {
        state.remaining_seconds -= 1;
        if state.remaining_seconds > 0 {
            return TickOutcome::Continue;
        }

        state.current_round += 1;
        state.total_rounds = config.total_rounds();
        if state.current_round > state.total_rounds {
            state.remaining_seconds = 0;
            return TickOutcome::Complete;
        }

        state.round_length_seconds = config.round_length_seconds();
        state.remaining_seconds = state.round_length_seconds;
        TickOutcome::RoundStarted {
            round: state.current_round,
            total: state.total_rounds,
        }
    }

    fn on_reset(&self, state: &mut TimerState, config: &WorkoutConfig) {
        Self::first_round(state, config);
    }
}

impl RoundsPolicy {
    fn first_round(state: &mut TimerState, config: &WorkoutConfig) {
        state.total_rounds = config.total_rounds();
        state.current_round = 1;
        state.round_length_seconds = config.round_length_seconds();
        state.remaining_seconds = state.round_length_seconds;
    }
}

// ============================================================================
// Cycle
// ============================================================================

/// Alternating work/rest with fixed lengths.
#[derive(Debug, Clone, Copy, Default)]
pub struct CyclePolicy;

impl CyclePolicy {
    fn rebaseline(state: &mut TimerState) {
        state.is_work_phase = true;
        state.remaining_seconds = CYCLE_WORK_SECONDS;
        state.cycle_index = 1;
        state.total_cycles = CYCLE_TOTAL;
    }
}

impl ModePolicy for CyclePolicy {
    fn is_fresh(&self, state: &TimerState) -> bool {
        state.is_work_phase && state.cycle_index == 1 && state.remaining_seconds == CYCLE_WORK_SECONDS
    }

    fn on_fresh_start(&self, state: &mut TimerState, _config: &WorkoutConfig) {
        Self::rebaseline(state);
    }

    fn on_tick(&self, state: &mut TimerState, _config: &WorkoutConfig) -> TickOutcome {
        state.remaining_seconds -= 1;
        if state.remaining_seconds > 0 {
            return TickOutcome::Continue;
        }

        if state.is_work_phase {
            state.is_work_phase = false;
            state.remaining_seconds = CYCLE_REST_SECONDS;
            return TickOutcome::PhaseChanged {
                work: false,
                cycle: state.cycle_index,
            };
        }

        state.cycle_index += 1;
        if state.cycle_index > state.total_cycles {
            state.remaining_seconds = 0;
            return TickOutcome::Complete;
        }

        state.is_work_phase = true;
        state.remaining_seconds = CYCLE_WORK_SECONDS;
        TickOutcome::PhaseChanged {
            work: true,
            cycle: state.cycle_index,
        }
    }

    fn on_reset(&self, state: &mut TimerState, _config: &WorkoutConfig) {
        Self::rebaseline(state);
    }
}

// ============================================================================
// Tests
// ============================================================================
