//! Timer controller for the workout timer.
//!
//! This module provides the core controller:
//! - Fresh start vs. resume dispatch per mode
//! - Pause, reset, mode change and live configuration edits
//! - Tick handling with stale-tick rejection
//! - Event firing for logging and the completion alert

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use super::clock::{ClockDriver, ClockTick};
use super::mode::TickOutcome;
use crate::config::{AppliedEdit, ConfigField, WorkoutConfig};
use crate::types::{StatusView, TimerPhase, TimerState, WorkoutMode};

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for logging and alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Clock started
    Started {
        /// Active mode
        mode: WorkoutMode,
        /// False when resuming a paused workout
        fresh: bool,
    },
    /// Clock stopped by the user
    Paused,
    /// Mode restored to its idle baseline
    Reset {
        /// Active mode
        mode: WorkoutMode,
    },
    /// Active mode switched
    ModeChanged {
        /// Previous mode
        from: WorkoutMode,
        /// New mode
        to: WorkoutMode,
    },
    /// Configuration field edited
    ConfigChanged {
        /// Edited field
        field: ConfigField,
        /// Effective value
        value: u32,
        /// True when the input was invalid and the default was used
        defaulted: bool,
    },
    /// A new round began
    RoundStarted {
        /// Round now running
        round: u32,
        /// Total rounds
        total: u32,
    },
    /// The cycle switched between work and rest
    PhaseChanged {
        /// True when the new phase is work
        work: bool,
        /// Cycle now running
        cycle: u32,
    },
    /// The workout reached its terminal state
    Completed {
        /// Mode that completed
        mode: WorkoutMode,
        /// User-facing alert message
        message: String,
    },
    /// One second elapsed
    Tick {
        /// Displayed seconds after the tick
        remaining_seconds: u64,
    },
}

// ============================================================================
// TimerError
// ============================================================================

/// Commands the controller refuses.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Start was requested while the mode is in its terminal state.
    #[error("{0} workout is complete; reset or change mode to start again")]
    AlreadyComplete(WorkoutMode),
}

// ============================================================================
// TimerController
// ============================================================================

/// Owns the timer state, the live configuration and the clock.
pub struct TimerController {
    /// Current timer state
    state: TimerState,
    /// Live configuration, re-read at transition points
    config: WorkoutConfig,
    /// Tick source
    clock: Box<dyn ClockDriver>,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerController {
    /// Creates a controller in stopwatch idle state.
    pub fn new(
        config: WorkoutConfig,
        clock: Box<dyn ClockDriver>,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        Self {
            state: TimerState::new(),
            config,
            clock,
            event_tx,
        }
    }

    /// Starts the active mode, fresh or resumed.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::AlreadyComplete`] if the mode has completed, or an
    /// error if the event channel is closed.
    pub fn start(&mut self) -> Result<()> {
        if self.state.completed {
            return Err(TimerError::AlreadyComplete(self.state.mode).into());
        }

        let policy = self.state.mode.policy();
        let fresh = !self.state.running && policy.is_fresh(&self.state);
        if fresh {
            policy.on_fresh_start(&mut self.state, &self.config);
        } else {
            policy.on_resume(&mut self.state);
        }

        self.state.running = true;
        self.clock.start();

        tracing::info!(
            "{} {} at {}",
            if fresh { "Started" } else { "Resumed" },
            self.state.mode,
            self.state.display_seconds()
        );

        self.emit(TimerEvent::Started {
            mode: self.state.mode,
            fresh,
        })
    }

    /// Pauses the timer. Pausing an already stopped timer changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn pause(&mut self) -> Result<()> {
        self.clock.stop();
        if !self.state.running {
            return Ok(());
        }

        self.state.running = false;
        tracing::info!("Paused {} at {}", self.state.mode, self.state.display_seconds());
        self.emit(TimerEvent::Paused)
    }

    /// Stops the clock and restores the active mode's idle baseline.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn reset(&mut self) -> Result<()> {
        self.reset_active_mode();
        self.emit(TimerEvent::Reset {
            mode: self.state.mode,
        })
    }

    /// Switches modes, resetting the old mode and then the new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn change_mode(&mut self, mode: WorkoutMode) -> Result<()> {
        let from = self.state.mode;
        self.reset_active_mode();
        self.state.mode = mode;
        self.reset_active_mode();

        tracing::info!("Mode changed: {} -> {}", from, mode);
        self.emit(TimerEvent::ModeChanged { from, to: mode })
    }

    /// Applies raw input to a configuration field.
    ///
    /// In rounds mode a stopped timer shows the new values immediately; a
    /// running one picks them up at the next round boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn edit_config(&mut self, field: ConfigField, raw: &str) -> Result<AppliedEdit> {
        let applied = self.config.apply_edit(field, raw);

        if self.state.mode == WorkoutMode::Rounds && !self.state.running && !self.state.completed {
            match field {
                ConfigField::RoundMinutes => {
                    self.state.round_length_seconds = self.config.round_length_seconds();
                    self.state.remaining_seconds = self.state.round_length_seconds;
                }
                ConfigField::TotalRounds => {
                    self.state.total_rounds = self.config.total_rounds();
                }
                ConfigField::CountdownMinutes => {}
            }
        }

        self.emit(TimerEvent::ConfigChanged {
            field,
            value: applied.value,
            defaulted: applied.fallback.is_some(),
        })?;
        Ok(applied)
    }

    /// Handles a tick from the clock, dropping ticks from stale subscriptions.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn on_clock_tick(&mut self, tick: ClockTick) -> Result<()> {
        if !self.clock.accepts(tick) {
            tracing::trace!("Dropping stale tick from clock {}", tick.generation);
            return Ok(());
        }
        self.tick()
    }

    /// Advances the active mode by one second. Does nothing unless running.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub fn tick(&mut self) -> Result<()> {
        if !self.state.running {
            return Ok(());
        }

        let outcome = self
            .state
            .mode
            .policy()
            .on_tick(&mut self.state, &self.config);

        self.emit(TimerEvent::Tick {
            remaining_seconds: self.state.display_seconds(),
        })?;

        match outcome {
            TickOutcome::Continue => Ok(()),
            TickOutcome::RoundStarted { round, total } => {
                tracing::info!("Round {}/{}", round, total);
                self.emit(TimerEvent::RoundStarted { round, total })
            }
            TickOutcome::PhaseChanged { work, cycle } => {
                tracing::info!("{} (cycle {})", if work { "WORK" } else { "REST" }, cycle);
                self.emit(TimerEvent::PhaseChanged { work, cycle })
            }
            TickOutcome::Complete => self.handle_complete(),
        }
    }

    /// Returns the lifecycle phase of the active mode.
    pub fn phase(&self) -> TimerPhase {
        if self.state.completed {
            TimerPhase::Complete
        } else if self.state.running {
            TimerPhase::Running
        } else if self
            .state
            .mode
            .policy()
            .is_fresh(&self.state)
        {
            TimerPhase::Idle
        } else {
            TimerPhase::Paused
        }
    }

    /// Returns a status snapshot for display.
    pub fn status(&self) -> StatusView {
        StatusView::from_timer_state(&self.state, self.phase())
    }

    /// Returns a reference to the current timer state.
    pub fn get_state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the live configuration.
    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }

    /// Returns true if the clock has a live subscription.
    pub fn clock_active(&self) -> bool {
        self.clock.is_active()
    }

    fn handle_complete(&mut self) -> Result<()> {
        self.clock.stop();
        self.state.running = false;
        self.state.completed = true;

        let mode = self.state.mode;
        let message = mode.completion_message().unwrap_or("Workout complete!");
        tracing::info!("{} complete", mode);

        self.emit(TimerEvent::Completed {
            mode,
            message: message.to_string(),
        })
    }

    fn reset_active_mode(&mut self) {
        self.clock.stop();
        self.state.running = false;
        self.state.completed = false;
        self.state
            .mode
            .policy()
            .on_reset(&mut self.state, &self.config);
    }

    fn emit(&self, event: TimerEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .context("Failed to send timer event")
    }
}

// ============================================================================
// Tests
// ============================================================================
