//! Errors of the daemon's socket surface.

use std::io;
use thiserror::Error;

use crate::reactor::ReactorError;

/// Result alias for the socket server and connection loop.
pub type ServerResult<T> = Result<T, ServerError>;

/// Why the daemon could not bind, accept or keep serving a connection.
///
/// Failures of individual calls never show up here; the reactor answers
/// those with error replies.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("socket I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A front-end sent a frame that could not be read.
    #[error("bad frame from front-end: {0}")]
    Protocol(#[from] ritual_protocol::ProtocolError),

    /// A call could not be answered; the connection is dropped.
    #[error(transparent)]
    Reactor(#[from] ReactorError),

    /// Another daemon is listening on the control socket.
    #[error("control socket {path} is held by a running daemon")]
    SocketInUse { path: String },

    /// The directory meant to hold the control socket is missing.
    #[error("no directory to create control socket {path} in")]
    SocketPathInvalid { path: String },

    /// A connection stayed silent for longer than the connection timeout.
    #[error("timed out waiting to {operation}")]
    Timeout { operation: &'static str },

    /// `ServerConfig` values the daemon cannot run with.
    #[error("invalid server config: {message}")]
    Config { message: String },

    /// The connection semaphore was closed.
    #[error("daemon is shutting down")]
    Shutdown,
}

impl ServerError {
    /// Builds a [`ServerError::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn socket_in_use(path: impl Into<String>) -> Self {
        Self::SocketInUse { path: path.into() }
    }

    pub fn socket_path_invalid(path: impl Into<String>) -> Self {
        Self::SocketPathInvalid { path: path.into() }
    }
}
