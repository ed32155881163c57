//! Command definitions for the workout timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{ConfigField, WorkoutConfig};
use crate::types::WorkoutMode;

// ============================================================================
// CLI Structure
// ============================================================================

/// Workout interval timer: AMRAP countdown, For Time stopwatch, EMOM rounds
/// and Tabata cycles
#[derive(Parser, Debug)]
#[command(
    name = "wodtimer",
    version,
    about = "Workout interval timer",
    long_about = "A workout interval timer. Run `wodtimer daemon` in one terminal, \
                  then drive it with start/pause/reset/mode/config from another.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Socket path (defaults to ~/.wodtimer/wodtimer.sock)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer daemon in the foreground
    Daemon(DaemonArgs),

    /// Start the workout, or resume it if paused
    Start,

    /// Pause the workout
    Pause,

    /// Reset the current mode to its starting point
    Reset,

    /// Switch workout mode (resets the timer)
    Mode {
        /// Mode to switch to
        #[arg(value_enum)]
        mode: WorkoutMode,
    },

    /// Edit a configuration value
    Config {
        /// Field to edit
        #[arg(value_enum)]
        field: ConfigField,

        /// New value; invalid input falls back to the default
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Show current timer status
    Status,

    /// Follow the timer once per second until it completes
    Watch,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Daemon Command Arguments
// ============================================================================

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Initial workout mode
    #[arg(short, long, value_enum, default_value_t = WorkoutMode::Stopwatch)]
    pub mode: WorkoutMode,

    /// Countdown length in minutes (default 10)
    #[arg(long, allow_hyphen_values = true)]
    pub minutes: Option<String>,

    /// Round length in minutes (default 1)
    #[arg(long, allow_hyphen_values = true)]
    pub round_minutes: Option<String>,

    /// Number of rounds (default 10)
    #[arg(short, long, allow_hyphen_values = true)]
    pub rounds: Option<String>,

    /// Do not ring the terminal bell on completion
    #[arg(long)]
    pub no_bell: bool,
}

impl DaemonArgs {
    /// Builds the initial configuration, substituting defaults for bad input.
    pub fn to_config(&self) -> WorkoutConfig {
        let mut config = WorkoutConfig::default();
        let inputs = [
            (ConfigField::CountdownMinutes, &self.minutes),
            (ConfigField::RoundMinutes, &self.round_minutes),
            (ConfigField::TotalRounds, &self.rounds),
        ];
        for (field, raw) in inputs {
            if let Some(raw) = raw {
                config.apply_edit(field, raw);
            }
        }
        config
    }
}

// ============================================================================
// Tests
// ============================================================================
