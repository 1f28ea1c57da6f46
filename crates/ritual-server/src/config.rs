//! Where and how the daemon listens for front-ends.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ServerError, ServerResult};

/// File name of the control socket.
pub const SOCKET_FILE_NAME: &str = "ritual.sock";

/// Listening settings of the control socket.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Control socket the daemon binds.
    pub socket_path: PathBuf,

    /// How long a connection may stay silent, and how long a reply write may
    /// block, before the connection is dropped.
    pub connection_timeout: Duration,

    /// Front-ends served at once; further connections wait to be accepted.
    pub max_connections: usize,

    /// Remove a leftover socket file when no daemon answers on it.
    pub cleanup_stale_socket: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            connection_timeout: Duration::from_secs(300),
            max_connections: 64,
            cleanup_stale_socket: true,
        }
    }
}

impl ServerConfig {
    /// Defaults, listening on `socket_path`.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            ..Default::default()
        }
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_cleanup_stale_socket(mut self, cleanup: bool) -> Self {
        self.cleanup_stale_socket = cleanup;
        self
    }

    /// Checks values that would leave the server unable to serve.
    pub fn validate(&self) -> ServerResult<()> {
        if self.max_connections == 0 {
            return Err(ServerError::config("max_connections must be at least 1"));
        }
        if self.connection_timeout.is_zero() {
            return Err(ServerError::config("connection_timeout must be non-zero"));
        }
        Ok(())
    }
}

/// `$XDG_RUNTIME_DIR/ritual.sock`, or `/tmp/ritual-$UID.sock` outside a
/// login session.
pub fn default_socket_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(runtime_dir).join(SOCKET_FILE_NAME)
    } else {
        #[cfg(unix)]
        // SAFETY: getuid has no preconditions and cannot fail.
        let uid = unsafe { libc::getuid() };
        #[cfg(not(unix))]
        let uid = 0;
        PathBuf::from(format!("/tmp/ritual-{uid}.sock"))
    }
}
