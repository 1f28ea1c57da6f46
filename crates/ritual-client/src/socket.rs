//! Unix socket transport to the ritual daemon.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UnixStream;
use tokio::sync::Mutex;
use tracing::debug;

use ritual_protocol::{ProtocolError, read_frame, write_frame};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::Transport;

/// Sends envelopes over one persistent connection to the daemon socket.
///
/// The connection is opened on first use and held for the whole
/// write-then-read exchange, so concurrent callers are served one after the
/// other. A failed or abandoned exchange discards the connection; the next
/// call reconnects, and a late reply is never taken as the answer to a later
/// call.
pub struct SocketTransport {
    socket_path: PathBuf,
    connect_timeout: Duration,
    stream: Mutex<Option<UnixStream>>,
}

impl SocketTransport {
    /// Creates a transport for the socket at `socket_path`.
    pub fn new(socket_path: impl Into<PathBuf>, connect_timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            connect_timeout,
            stream: Mutex::new(None),
        }
    }

    /// Creates a transport from client configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.socket_path(), config.timeout())
    }

    /// Creates a transport with the default socket path.
    pub fn with_defaults() -> Self {
        Self::from_config(&ClientConfig::default())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Checks if the daemon socket exists.
    pub fn socket_exists(&self) -> bool {
        self.socket_path.exists()
    }

    async fn connect(&self) -> ClientResult<UnixStream> {
        debug!(socket = %self.socket_path.display(), "Connecting to daemon");

        tokio::time::timeout(self.connect_timeout, UnixStream::connect(&self.socket_path))
            .await
            .map_err(|_| {
                ClientError::Timeout(format!(
                    "connecting to {} after {:?}",
                    self.socket_path.display(),
                    self.connect_timeout
                ))
            })?
            .map_err(|e| {
                ClientError::Connection(format!(
                    "failed to connect to {}: {e}",
                    self.socket_path.display()
                ))
            })
    }
}

#[async_trait]
impl Transport for SocketTransport {
    async fn send(&self, request: Vec<u8>) -> ClientResult<Vec<u8>> {
        let mut slot = self.stream.lock().await;

        let mut stream = match slot.take() {
            Some(mut stream) => match write_frame(&mut stream, &request).await {
                Ok(()) => stream,
                Err(e) => {
                    // Nothing reached the daemon, so a fresh connection is safe.
                    debug!(error = %e, "Reconnecting after stale connection");
                    let mut stream = self.connect().await?;
                    write_frame(&mut stream, &request).await.map_err(frame_error)?;
                    stream
                }
            },
            None => {
                let mut stream = self.connect().await?;
                write_frame(&mut stream, &request).await.map_err(frame_error)?;
                stream
            }
        };

        let reply = read_frame(&mut stream)
            .await
            .map_err(frame_error)?
            .ok_or_else(|| ClientError::Connection("daemon closed the connection".into()))?;

        *slot = Some(stream);
        Ok(reply)
    }
}

fn frame_error(err: ProtocolError) -> ClientError {
    match err {
        ProtocolError::Io(e) => ClientError::Io(e),
        other => ClientError::Protocol(other),
    }
}
