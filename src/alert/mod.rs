//! Completion alerts for the workout timer.
//!
//! A workout raises exactly one alert when it reaches its terminal state.
//! Alert failures are logged by the caller and never stop the timer.

use std::io::Write;
use std::sync::Mutex;

use thiserror::Error;

use crate::types::WorkoutMode;

/// Errors that can occur while raising an alert.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Writing to the terminal failed.
    #[error("Failed to write alert: {0}")]
    Io(#[from] std::io::Error),

    /// Generic alert error.
    #[error("Alert error: {0}")]
    Other(String),
}

/// Trait for completion alert implementations.
pub trait Alert: Send + Sync {
    /// Raises the alert for a completed workout.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert could not be delivered.
    fn notify(&self, mode: WorkoutMode, message: &str) -> Result<(), AlertError>;
}

// ============================================================================
// TerminalAlert
// ============================================================================

/// Prints the message to stdout, optionally ringing the terminal bell.
#[derive(Debug, Clone)]
pub struct TerminalAlert {
    bell: bool,
}

impl TerminalAlert {
    /// Creates a terminal alert.
    #[must_use]
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }

    fn write_to(&self, out: &mut impl Write, mode: WorkoutMode, message: &str) -> std::io::Result<()> {
        if self.bell {
            write!(out, "\x07")?;
        }
        writeln!(out, "[{}] {}", mode.label(), message)?;
        out.flush()
    }
}

impl Default for TerminalAlert {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Alert for TerminalAlert {
    fn notify(&self, mode: WorkoutMode, message: &str) -> Result<(), AlertError> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.write_to(&mut out, mode, message)?;
        Ok(())
    }
}

// ============================================================================
// MockAlert
// ============================================================================

/// Mock alert for testing.
#[derive(Debug, Default)]
pub struct MockAlert {
    calls: Mutex<Vec<(WorkoutMode, String)>>,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockAlert {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn alert_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn get_calls(&self) -> Vec<(WorkoutMode, String)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Alert for MockAlert {
    fn notify(&self, mode: WorkoutMode, message: &str) -> Result<(), AlertError> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AlertError::Other("Mock failure".to_string()));
        }
        self.calls
            .lock()
            .map_err(|e| AlertError::Other(e.to_string()))?
            .push((mode, message.to_string()));
        Ok(())
    }
}
