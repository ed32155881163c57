//! IPC Server for the workout timer daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer commands
//! - Dispatch into the shared TimerController

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};

use crate::config::ConfigField;
use crate::types::{IpcRequest, IpcResponse, WorkoutMode};

use super::timer::TimerController;

// ============================================================================
// Constants
// ============================================================================

/// Socket path relative to the home directory
pub const DEFAULT_SOCKET_PATH: &str = ".wodtimer/wodtimer.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Returns the default socket path under the home directory.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_socket_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    Ok(home.join(DEFAULT_SOCKET_PATH))
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// Client closed the connection before sending a request
    #[error("Connection closed by client")]
    ConnectionClosed,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Listener for wodtimer CLI connections. Each connection carries one
/// JSON request and one JSON response.
pub struct IpcServer {
    listener: UnixListener,
    /// Unlinked on drop
    socket_path: PathBuf,
}

impl IpcServer {
    /// Binds the daemon socket, creating `~/.wodtimer` (or the `--socket`
    /// parent) on first run. A socket left by a crashed daemon is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, the stale socket or the bind fails.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            tracing::warn!("Replacing stale daemon socket {:?}", socket_path);
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove stale socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        tracing::debug!("IPC server listening on {:?}", socket_path);

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Waits for the next CLI connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Reads the connection's single command. The CLI writes the whole
    /// request in one go, so one read of at most `MAX_REQUEST_SIZE` bytes
    /// is the request.
    ///
    /// # Errors
    ///
    /// Returns an [`IpcError`] when the client is silent for
    /// `READ_TIMEOUT_SECS`, hangs up, or oversends, and a parse error for
    /// anything that is not an `IpcRequest`.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE + 1];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            return Err(IpcError::ConnectionClosed.into());
        }
        if n > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Writes the reply. The caller drops the stream afterwards, which is
    /// the client's end-of-response marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the client has gone away.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

// Leaves no socket behind for `status` to find after the daemon exits.
impl Drop for IpcServer {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.socket_path) {
            tracing::debug!("Socket {:?} not removed: {}", self.socket_path, e);
        }
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the TimerController.
pub struct RequestHandler {
    /// Shared reference to the timer controller
    controller: Arc<Mutex<TimerController>>,
}

impl RequestHandler {
    /// Creates a new request handler with the given controller.
    pub fn new(controller: Arc<Mutex<TimerController>>) -> Self {
        Self { controller }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        tracing::debug!("Handling request: {:?}", request);

        match request {
            IpcRequest::Start => self.handle_start().await,
            IpcRequest::Pause => self.handle_pause().await,
            IpcRequest::Reset => self.handle_reset().await,
            IpcRequest::Mode { mode } => self.handle_mode(mode).await,
            IpcRequest::Config { field, value } => self.handle_config(field, &value).await,
            IpcRequest::Status => self.handle_status().await,
        }
    }

    async fn handle_start(&self) -> IpcResponse {
        let mut controller = self.controller.lock().await;

        match controller.start() {
            Ok(()) => IpcResponse::success("Timer started", Some(controller.status())),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    async fn handle_pause(&self) -> IpcResponse {
        let mut controller = self.controller.lock().await;

        match controller.pause() {
            Ok(()) => IpcResponse::success("Timer paused", Some(controller.status())),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    async fn handle_reset(&self) -> IpcResponse {
        let mut controller = self.controller.lock().await;

        match controller.reset() {
            Ok(()) => IpcResponse::success("Timer reset", Some(controller.status())),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    async fn handle_mode(&self, mode: WorkoutMode) -> IpcResponse {
        let mut controller = self.controller.lock().await;

        match controller.change_mode(mode) {
            Ok(()) => IpcResponse::success(
                format!("Switched to {}", mode.label()),
                Some(controller.status()),
            ),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    async fn handle_config(&self, field: ConfigField, value: &str) -> IpcResponse {
        let mut controller = self.controller.lock().await;

        match controller.edit_config(field, value) {
            Ok(applied) => {
                let message = match &applied.fallback {
                    Some(e) => format!("{}; using default {}", e, applied.display_value()),
                    None => format!("{} set to {}", field, applied.display_value()),
                };
                IpcResponse::success(message, Some(controller.status()))
            }
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    async fn handle_status(&self) -> IpcResponse {
        let controller = self.controller.lock().await;
        IpcResponse::success("", Some(controller.status()))
    }
}

// ============================================================================
// Tests
// ============================================================================
