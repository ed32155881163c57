//! Core data types for the workout timer.
//!
//! This module defines the data structures used for:
//! - Workout modes and the derived timer phase
//! - Timer state shared by the mode policies
//! - The status snapshot rendered by the CLI
//! - IPC request/response serialization

use serde::{Deserialize, Serialize};

use crate::config::ConfigField;

/// Work phase length of a Work/Rest cycle, in seconds.
pub const CYCLE_WORK_SECONDS: i64 = 20;

/// Rest phase length of a Work/Rest cycle, in seconds.
pub const CYCLE_REST_SECONDS: i64 = 10;

/// Number of work/rest cycles in a full workout.
pub const CYCLE_TOTAL: u32 = 8;

// ============================================================================
// WorkoutMode
// ============================================================================

/// The workout mode driving the timer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutMode {
    /// Count down from the requested minutes to zero (AMRAP)
    #[value(alias = "amrap")]
    Countdown,
    /// Count up from zero until stopped (For Time)
    #[default]
    #[value(alias = "for-time")]
    Stopwatch,
    /// Fixed-length rounds repeated a set number of times (EMOM)
    #[value(alias = "emom")]
    Rounds,
    /// Alternating 20s work / 10s rest, 8 cycles (Tabata)
    #[value(alias = "tabata")]
    Cycle,
}

impl WorkoutMode {
    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutMode::Countdown => "countdown",
            WorkoutMode::Stopwatch => "stopwatch",
            WorkoutMode::Rounds => "rounds",
            WorkoutMode::Cycle => "cycle",
        }
    }

    /// Returns the workout name shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutMode::Countdown => "AMRAP",
            WorkoutMode::Stopwatch => "For Time",
            WorkoutMode::Rounds => "EMOM",
            WorkoutMode::Cycle => "Tabata",
        }
    }

    /// Returns the alert raised when the mode reaches its terminal state.
    ///
    /// The stopwatch never completes on its own, so it has no message.
    pub fn completion_message(&self) -> Option<&'static str> {
        match self {
            WorkoutMode::Countdown => Some("Time's up! Great workout!"),
            WorkoutMode::Stopwatch => None,
            WorkoutMode::Rounds => Some("EMOM complete!"),
            WorkoutMode::Cycle => Some("Work/Rest cycle complete!"),
        }
    }
}

impl std::fmt::Display for WorkoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TimerPhase
// ============================================================================

/// Lifecycle phase of the active mode, derived from the timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// At the mode's fresh baseline, not ticking
    #[default]
    Idle,
    /// Clock subscription active
    Running,
    /// Stopped mid-workout, will resume on start
    Paused,
    /// Terminal; only reset or a mode change leaves it
    Complete,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
            TimerPhase::Complete => "complete",
        }
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// The single timer state owned by the controller.
///
/// Counters that only matter to one mode are kept here regardless of the
/// active mode; each mode policy resets the ones it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Active workout mode
    pub mode: WorkoutMode,
    /// Displayed time (elapsed for the stopwatch); may dip below zero mid-tick
    pub remaining_seconds: i64,
    /// True iff the clock has a live subscription
    pub running: bool,
    /// Countdown fresh-start time, restored on reset
    pub baseline_seconds: i64,
    /// Current round (rounds mode)
    pub current_round: u32,
    /// Total rounds (rounds mode)
    pub total_rounds: u32,
    /// Length of the round in progress (rounds mode)
    pub round_length_seconds: i64,
    /// Whether the cycle is in its work phase (cycle mode)
    pub is_work_phase: bool,
    /// Current cycle (cycle mode)
    pub cycle_index: u32,
    /// Total cycles (cycle mode)
    pub total_cycles: u32,
    /// Set once the mode reaches its terminal state
    pub completed: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerState {
    /// Creates a new TimerState with stopwatch defaults.
    pub fn new() -> Self {
        Self {
            mode: WorkoutMode::Stopwatch,
            remaining_seconds: 0,
            running: false,
            baseline_seconds: 0,
            current_round: 1,
            total_rounds: 1,
            round_length_seconds: 0,
            is_work_phase: true,
            cycle_index: 1,
            total_cycles: CYCLE_TOTAL,
            completed: false,
        }
    }

    /// Returns the time to display, clamped at zero.
    pub fn display_seconds(&self) -> u64 {
        self.remaining_seconds.max(0) as u64
    }

    /// Returns "WORK" or "REST" for the cycle mode.
    pub fn phase_label(&self) -> &'static str {
        if self.is_work_phase {
            "WORK"
        } else {
            "REST"
        }
    }
}

/// Formats seconds as `MM:SS`.
///
/// Minutes are zero-padded to two digits and grow past them when needed.
pub fn format_clock(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

// ============================================================================
// StatusView
// ============================================================================

/// Snapshot of the timer pushed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    /// Active mode
    pub mode: WorkoutMode,
    /// Lifecycle phase
    pub state: TimerPhase,
    /// Time formatted as MM:SS
    pub display: String,
    /// Displayed seconds, clamped at zero
    pub remaining_seconds: u64,
    /// Current round (rounds mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_round: Option<u32>,
    /// Total rounds (rounds mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rounds: Option<u32>,
    /// "WORK" or "REST" (cycle mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_label: Option<String>,
    /// Current cycle (cycle mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_index: Option<u32>,
    /// Total cycles (cycle mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cycles: Option<u32>,
}

impl StatusView {
    /// Creates a status view from the timer state and its derived phase.
    pub fn from_timer_state(state: &TimerState, phase: TimerPhase) -> Self {
        let seconds = state.display_seconds();
        let mut view = Self {
            mode: state.mode,
            state: phase,
            display: format_clock(seconds),
            remaining_seconds: seconds,
            current_round: None,
            total_rounds: None,
            phase_label: None,
            cycle_index: None,
            total_cycles: None,
        };

        match state.mode {
            WorkoutMode::Rounds => {
                view.current_round = Some(state.current_round);
                view.total_rounds = Some(state.total_rounds);
            }
            WorkoutMode::Cycle => {
                view.phase_label = Some(state.phase_label().to_string());
                view.cycle_index = Some(state.cycle_index);
                view.total_cycles = Some(state.total_cycles);
            }
            WorkoutMode::Countdown | WorkoutMode::Stopwatch => {}
        }

        view
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Fresh-start or resume the active mode
    Start,
    /// Pause the timer
    Pause,
    /// Reset the active mode to its idle baseline
    Reset,
    /// Switch to another mode
    Mode {
        /// Mode to switch to
        mode: WorkoutMode,
    },
    /// Edit a configuration field from raw user input
    Config {
        /// Field to edit
        field: ConfigField,
        /// Raw input; invalid values fall back to defaults
        value: String,
    },
    /// Query the current status
    Status,
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional status snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StatusView>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<StatusView>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true if this is an error response.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

// ============================================================================
// Tests
// ============================================================================
