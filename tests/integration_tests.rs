//! Integration tests for Daemon-CLI IPC communication.
//!
//! These tests drive a real `IpcServer` with the `IpcClient`, backed by a
//! controller on a manual clock:
//! - Start / pause / reset round trips
//! - Mode switching and configuration edits
//! - Status queries
//! - Error responses and connection failures

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::time::{timeout, Duration};

use wodtimer::cli::client::IpcClient;
use wodtimer::config::{ConfigField, WorkoutConfig};
use wodtimer::daemon::ipc::{IpcServer, RequestHandler};
use wodtimer::daemon::{serve_connection, ManualClock, TimerController, TimerEvent};
use wodtimer::types::{TimerPhase, WorkoutMode};

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates a temporary socket path for testing.
fn create_temp_socket_path() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("integration_test.sock");
    // Keep the directory so it's not deleted
    std::mem::forget(dir);
    path
}

/// Creates a controller on a manual clock with an event channel.
fn create_controller() -> (
    Arc<Mutex<TimerController>>,
    mpsc::UnboundedReceiver<TimerEvent>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = TimerController::new(
        WorkoutConfig::default(),
        Box::new(ManualClock::new()),
        tx,
    );
    (Arc::new(Mutex::new(controller)), rx)
}

/// Runs `count` request-response cycles on the server.
async fn handle_requests(server: &IpcServer, handler: &RequestHandler, count: usize) {
    for _ in 0..count {
        let stream = server.accept().await.unwrap();
        serve_connection(handler, stream).await.unwrap();
    }
}

/// Spawns a server task that answers `count` requests.
fn spawn_server(
    socket_path: &PathBuf,
    controller: Arc<Mutex<TimerController>>,
    count: usize,
) -> tokio::task::JoinHandle<()> {
    let server = IpcServer::new(socket_path).unwrap();
    let handler = RequestHandler::new(controller);
    tokio::spawn(async move {
        handle_requests(&server, &handler, count).await;
    })
}

// ============================================================================
// Start / Pause / Reset
// ============================================================================

/// Starting through IPC runs the timer and reports it in the response.
#[tokio::test]
async fn test_start_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (controller, mut rx) = create_controller();
    let server = spawn_server(&socket_path, controller.clone(), 1);

    let client = IpcClient::with_socket_path(socket_path);
    let response = timeout(Duration::from_secs(5), client.start())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(response.message, "Timer started");
    let view = response.data.unwrap();
    assert_eq!(view.state, TimerPhase::Running);
    assert_eq!(view.mode, WorkoutMode::Stopwatch);
    assert_eq!(view.display, "00:00");

    assert!(controller.lock().await.get_state().running);
    assert_eq!(
        rx.recv().await,
        Some(TimerEvent::Started {
            mode: WorkoutMode::Stopwatch,
            fresh: true
        })
    );
    server.await.unwrap();
}

/// Pause keeps the elapsed time; start resumes from it.
#[tokio::test]
async fn test_pause_and_resume_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (controller, _rx) = create_controller();
    let server = spawn_server(&socket_path, controller.clone(), 3);
    let client = IpcClient::with_socket_path(socket_path);

    client.start().await.unwrap();
    {
        let mut c = controller.lock().await;
        for _ in 0..5 {
            c.tick().unwrap();
        }
    }

    let paused = client.pause().await.unwrap();
    let view = paused.data.unwrap();
    assert_eq!(view.state, TimerPhase::Paused);
    assert_eq!(view.display, "00:05");

    let resumed = client.start().await.unwrap();
    let view = resumed.data.unwrap();
    assert_eq!(view.state, TimerPhase::Running);
    assert_eq!(view.remaining_seconds, 5);

    server.await.unwrap();
}

/// Reset restores the active mode's baseline and stops the clock.
#[tokio::test]
async fn test_reset_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (controller, _rx) = create_controller();
    controller
        .lock()
        .await
        .change_mode(WorkoutMode::Countdown)
        .unwrap();
    let server = spawn_server(&socket_path, controller.clone(), 2);
    let client = IpcClient::with_socket_path(socket_path);

    client.start().await.unwrap();
    controller.lock().await.tick().unwrap();

    let response = client.reset().await.unwrap();
    let view = response.data.unwrap();
    assert_eq!(response.message, "Timer reset");
    assert_eq!(view.state, TimerPhase::Idle);
    assert_eq!(view.display, "10:00");
    assert!(!controller.lock().await.clock_active());

    server.await.unwrap();
}

// ============================================================================
// Mode and Config
// ============================================================================

/// Switching to rounds mode shows the first round at full length.
#[tokio::test]
async fn test_mode_change_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (controller, _rx) = create_controller();
    let server = spawn_server(&socket_path, controller, 1);

    let client = IpcClient::with_socket_path(socket_path);
    let response = client.change_mode(WorkoutMode::Rounds).await.unwrap();

    assert_eq!(response.message, "Switched to EMOM");
    let view = response.data.unwrap();
    assert_eq!(view.mode, WorkoutMode::Rounds);
    assert_eq!(view.display, "01:00");
    assert_eq!(view.current_round, Some(1));
    assert_eq!(view.total_rounds, Some(10));

    server.await.unwrap();
}

/// An idle rounds timer shows edited values immediately.
#[tokio::test]
async fn test_config_edit_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (controller, _rx) = create_controller();
    let server = spawn_server(&socket_path, controller.clone(), 3);
    let client = IpcClient::with_socket_path(socket_path);

    client.change_mode(WorkoutMode::Rounds).await.unwrap();
    client
        .edit_config(ConfigField::RoundMinutes, "2")
        .await
        .unwrap();
    let response = client
        .edit_config(ConfigField::TotalRounds, "5")
        .await
        .unwrap();

    let view = response.data.unwrap();
    assert_eq!(view.display, "02:00");
    assert_eq!(view.total_rounds, Some(5));
    assert_eq!(controller.lock().await.config().total_rounds(), 5);

    server.await.unwrap();
}

/// Invalid input is reported but the edit still succeeds with the default.
#[tokio::test]
async fn test_invalid_config_falls_back_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (controller, _rx) = create_controller();
    let server = spawn_server(&socket_path, controller.clone(), 1);
    let client = IpcClient::with_socket_path(socket_path);

    let response = client
        .edit_config(ConfigField::TotalRounds, "-4")
        .await
        .unwrap();

    assert!(!response.is_error());
    assert!(response.message.contains("default"));
    assert_eq!(controller.lock().await.config().total_rounds(), 10);

    server.await.unwrap();
}

// ============================================================================
// Status and Errors
// ============================================================================

/// Status of a fresh daemon is an idle stopwatch at zero.
#[tokio::test]
async fn test_status_query_via_ipc() {
    let socket_path = create_temp_socket_path();
    let (controller, _rx) = create_controller();
    let server = spawn_server(&socket_path, controller, 1);

    let client = IpcClient::with_socket_path(socket_path);
    let response = client.status().await.unwrap();

    let view = response.data.unwrap();
    assert_eq!(view.state, TimerPhase::Idle);
    assert_eq!(view.display, "00:00");
    assert!(view.current_round.is_none());
    assert!(view.phase_label.is_none());

    server.await.unwrap();
}

/// Starting a completed workout is refused until it is reset.
#[tokio::test]
async fn test_start_after_complete_is_error() {
    let socket_path = create_temp_socket_path();
    let (controller, _rx) = create_controller();
    {
        let mut c = controller.lock().await;
        c.edit_config(ConfigField::CountdownMinutes, "0.05").unwrap();
        c.change_mode(WorkoutMode::Countdown).unwrap();
        c.start().unwrap();
        for _ in 0..3 {
            c.tick().unwrap();
        }
        assert_eq!(c.phase(), TimerPhase::Complete);
    }
    let server = spawn_server(&socket_path, controller.clone(), 3);
    let client = IpcClient::with_socket_path(socket_path).with_max_retries(1);

    let result = client.start().await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("complete"));

    client.reset().await.unwrap();
    let response = client.start().await.unwrap();
    assert_eq!(response.data.unwrap().display, "00:03");

    server.await.unwrap();
}

/// Without a daemon the client fails with a hint to start one.
#[tokio::test]
async fn test_connection_error_without_daemon() {
    let socket_path = create_temp_socket_path();
    let client = IpcClient::with_socket_path(socket_path).with_max_retries(1);

    let result = client.status().await;

    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("wodtimer daemon"));
}
