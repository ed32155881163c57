//! Display utilities for the workout timer CLI.
//!
//! This module provides formatted output for:
//! - Command results
//! - Error messages
//! - Status display
//! - The single-line view used by `watch`

use crate::types::{IpcResponse, StatusView, TimerPhase};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the result of a command followed by the timer line.
    pub fn show_command_result(response: &IpcResponse) {
        if !response.message.is_empty() {
            println!("{}", response.message);
        }
        if let Some(view) = &response.data {
            println!("  {}", Self::status_line(view));
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        match &response.data {
            Some(view) => {
                for line in Self::status_lines(view) {
                    println!("{}", line);
                }
            }
            None => println!("The timer daemon is not running"),
        }
    }

    /// Redraws the watch line in place.
    pub fn show_watch_line(view: &StatusView) {
        use std::io::Write;

        print!("\r\x1b[2K{}", Self::status_line(view));
        let _ = std::io::stdout().flush();
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Formats the status as a single line.
    pub fn status_line(view: &StatusView) -> String {
        let mut line = format!("{:<8} {}", view.mode.label(), view.display);

        if let (Some(round), Some(total)) = (view.current_round, view.total_rounds) {
            line.push_str(&format!("  Round {}/{}", round.min(total), total));
        }
        if let Some(label) = &view.phase_label {
            line.push_str(&format!("  {}", label));
        }
        if let (Some(cycle), Some(total)) = (view.cycle_index, view.total_cycles) {
            line.push_str(&format!("  Cycle {}/{}", cycle.min(total), total));
        }

        line.push_str(&format!("  [{}]", Self::phase_display(view.state)));
        line
    }

    /// Formats the status as a labelled block.
    pub fn status_lines(view: &StatusView) -> Vec<String> {
        let mut lines = vec![
            "Workout timer status".to_string(),
            "─────────────────────".to_string(),
            format!("Mode:  {} ({})", view.mode.label(), view.mode),
            format!("State: {}", Self::phase_display(view.state)),
            format!("Time:  {}", view.display),
        ];

        if let (Some(round), Some(total)) = (view.current_round, view.total_rounds) {
            lines.push(format!("Round: {}/{}", round.min(total), total));
        }
        if let (Some(label), Some(cycle), Some(total)) =
            (&view.phase_label, view.cycle_index, view.total_cycles)
        {
            lines.push(format!("Phase: {} (cycle {}/{})", label, cycle.min(total), total));
        }

        lines
    }

    fn phase_display(phase: TimerPhase) -> &'static str {
        match phase {
            TimerPhase::Idle => "ready",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
            TimerPhase::Complete => "complete",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
