//! Daemon module for the workout timer.
//!
//! This module contains the core daemon functionality:
//! - `clock`: Single-subscription one-second tick source
//! - `mode`: Transition policies for the four workout modes
//! - `timer`: Controller owning the timer state
//! - `ipc`: Unix socket server the CLI talks to
//!
//! [`run`] wires them together on a single-threaded runtime: IPC requests,
//! clock ticks and timer events are all processed on one task loop.

pub mod clock;
pub mod ipc;
pub mod mode;
pub mod timer;

pub use clock::{ClockDriver, ClockTick, IntervalClock, ManualClock};
pub use ipc::{IpcServer, RequestHandler};
pub use mode::{ModePolicy, TickOutcome};
pub use timer::{TimerController, TimerError, TimerEvent};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::UnixStream;
use tokio::sync::{mpsc, Mutex};

use crate::alert::{Alert, TerminalAlert};
use crate::config::WorkoutConfig;
use crate::types::WorkoutMode;

/// Startup options for the daemon.
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    /// Socket to listen on
    pub socket_path: PathBuf,
    /// Initial configuration
    pub config: WorkoutConfig,
    /// Initial mode
    pub mode: WorkoutMode,
    /// Ring the terminal bell on completion
    pub bell: bool,
}

/// Runs the daemon until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound or the timer's event
/// channel breaks.
pub async fn run(options: DaemonOptions) -> Result<()> {
    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let clock = IntervalClock::new(tick_tx);
    let mut controller = TimerController::new(options.config, Box::new(clock), event_tx);
    controller.change_mode(options.mode)?;
    let controller = Arc::new(Mutex::new(controller));

    let handler = Arc::new(RequestHandler::new(controller.clone()));
    let server = IpcServer::new(&options.socket_path)?;
    let alert = TerminalAlert::new(options.bell);

    tracing::info!(
        "Daemon listening on {:?} in {} mode",
        server.socket_path(),
        options.mode
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = server.accept() => match accepted {
                Ok(stream) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(&handler, stream).await {
                            tracing::warn!("IPC connection failed: {:#}", e);
                        }
                    });
                }
                Err(e) => tracing::warn!("{:#}", e),
            },
            Some(tick) = tick_rx.recv() => {
                controller.lock().await.on_clock_tick(tick)?;
            }
            Some(event) = event_rx.recv() => {
                dispatch_event(&alert, &event);
            }
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    controller.lock().await.pause()?;
    Ok(())
}

/// Serves a single request on an accepted connection.
///
/// # Errors
///
/// Returns an error if the request cannot be read or the response written.
pub async fn serve_connection(handler: &RequestHandler, mut stream: UnixStream) -> Result<()> {
    let request = IpcServer::receive_request(&mut stream).await?;
    let response = handler.handle(request).await;
    IpcServer::send_response(&mut stream, &response).await
}

/// Logs a timer event and raises the completion alert.
pub fn dispatch_event(alert: &dyn Alert, event: &TimerEvent) {
    match event {
        TimerEvent::Tick { remaining_seconds } => {
            tracing::trace!("tick {}", remaining_seconds);
        }
        TimerEvent::Completed { mode, message } => {
            if let Err(e) = alert.notify(*mode, message) {
                tracing::warn!("Completion alert failed: {}", e);
            }
        }
        other => tracing::debug!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::MockAlert;

    #[test]
    fn test_dispatch_completed_raises_alert() {
        let alert = MockAlert::new();
        dispatch_event(
            &alert,
            &TimerEvent::Completed {
                mode: WorkoutMode::Rounds,
                message: "EMOM complete!".to_string(),
            },
        );

        assert_eq!(
            alert.get_calls(),
            vec![(WorkoutMode::Rounds, "EMOM complete!".to_string())]
        );
    }

    #[test]
    fn test_dispatch_other_events_are_silent() {
        let alert = MockAlert::new();
        dispatch_event(&alert, &TimerEvent::Paused);
        dispatch_event(
            &alert,
            &TimerEvent::Tick {
                remaining_seconds: 3,
            },
        );
        assert_eq!(alert.alert_count(), 0);
    }

    #[test]
    fn test_dispatch_survives_alert_failure() {
        let alert = MockAlert::new();
        alert.set_should_fail(true);
        dispatch_event(
            &alert,
            &TimerEvent::Completed {
                mode: WorkoutMode::Countdown,
                message: "Time's up! Great workout!".to_string(),
            },
        );
        assert_eq!(alert.alert_count(), 0);
    }
}
