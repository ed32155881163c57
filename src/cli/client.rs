//! IPC Client for communicating with the workout timer daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic (connect failures only)
//! - Timeout handling

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::config::ConfigField;
use crate::daemon::ipc::default_socket_path;
use crate::types::{IpcRequest, IpcResponse, WorkoutMode};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: usize = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// ClientError
// ============================================================================

/// Failure of a single request to the daemon.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No daemon is listening on the socket.
    #[error("Cannot connect to the daemon at {path:?}. Start it with 'wodtimer daemon'")]
    Connect {
        /// Socket that was tried
        path: PathBuf,
        /// Underlying connect error
        #[source]
        source: std::io::Error,
    },

    /// Connecting took longer than the connection timeout.
    #[error("Connection to {0:?} timed out")]
    ConnectTimeout(PathBuf),

    /// The daemon answered with an error response.
    #[error("{0}")]
    Rejected(String),

    /// Sending the request or reading the response failed.
    #[error(transparent)]
    Exchange(#[from] anyhow::Error),
}

impl ClientError {
    /// Returns true if the request never reached the daemon.
    ///
    /// Anything else may already have been applied, so it is not re-sent.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::ConnectTimeout(_))
    }
}

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
    /// Attempts per request
    max_retries: u32,
}

impl IpcClient {
    /// Creates a new IPC client with the default socket path.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_socket_path(default_socket_path()?))
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
            max_retries: MAX_RETRIES,
        }
    }

    /// Sets the number of attempts per request (at least one).
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &PathBuf {
        &self.socket_path
    }

    /// Sends a start command to the daemon.
    pub async fn start(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Start).await
    }

    /// Sends a pause command to the daemon.
    pub async fn pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Pause).await
    }

    /// Sends a reset command to the daemon.
    pub async fn reset(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Reset).await
    }

    /// Asks the daemon to switch modes.
    pub async fn change_mode(&self, mode: WorkoutMode) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Mode { mode })
            .await
    }

    /// Sends a configuration edit to the daemon.
    pub async fn edit_config(&self, field: ConfigField, value: &str) -> Result<IpcResponse> {
        let request = IpcRequest::Config {
            field,
            value: value.to_string(),
        };
        self.send_request_with_retry(&request).await
    }

    /// Sends a status query to the daemon.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    /// Sends a request to the daemon, retrying while it cannot be reached.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut attempt = 1;

        loop {
            match self.send_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {:#}",
                        attempt,
                        self.max_retries,
                        e
                    );
                    let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Sends a single request to the daemon.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse, ClientError> {
        let mut stream = timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .map_err(|_| ClientError::ConnectTimeout(self.socket_path.clone()))?
            .map_err(|source| ClientError::Connect {
                path: self.socket_path.clone(),
                source,
            })?;

        let response = Self::exchange(&mut stream, request).await?;

        if response.is_error() {
            return Err(ClientError::Rejected(response.message));
        }

        Ok(response)
    }

    /// Writes the request and reads the daemon's response.
    async fn exchange(stream: &mut UnixStream, request: &IpcRequest) -> Result<IpcResponse> {
        let request_json =
            serde_json::to_string(request).context("Failed to serialize request")?;

        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(request_json.as_bytes()),
        )
        .await
        .context("Write timed out")?
        .context("Failed to send request")?;

        timeout(Duration::from_secs(IO_TIMEOUT_SECS), stream.flush())
            .await
            .context("Flush timed out")?
            .context("Failed to flush request")?;

        // Shutdown write side to signal end of request
        stream
            .shutdown()
            .await
            .context("Failed to shut down write side")?;

        let mut buffer = vec![0u8; MAX_RESPONSE_SIZE];
        let n = timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await
        .context("Read timed out")?
        .context("Failed to receive response")?;

        if n == 0 {
            anyhow::bail!("The daemon closed the connection without responding");
        }

        serde_json::from_slice(&buffer[..n]).context("Failed to parse response")
    }
}

// ============================================================================
// Tests
// ============================================================================
