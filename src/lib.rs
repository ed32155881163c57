//! Workout Timer Library
//!
//! This library provides the core functionality for the workout timer CLI.
//! It includes:
//! - Timer controller and mode policies for AMRAP, For Time, EMOM and Tabata
//! - A one-second clock driver with stale-tick protection
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities
//! - Configuration parsing with default fallback
//! - Completion alerts

pub mod alert;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    format_clock, IpcRequest, IpcResponse, StatusView, TimerPhase, TimerState, WorkoutMode,
};

pub use config::{AppliedEdit, ConfigError, ConfigField, WorkoutConfig};

pub use daemon::{
    ClockDriver, ClockTick, IntervalClock, ManualClock, ModePolicy, TickOutcome, TimerController,
    TimerError, TimerEvent,
};

pub use alert::{Alert, AlertError, MockAlert, TerminalAlert};
