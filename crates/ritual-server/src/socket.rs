//! Unix socket listener for the control plane.
//!
//! Each connection carries length-prefixed frames, one envelope per frame.
//! Calls on a connection are answered strictly in the order they arrive.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info, warn};

use ritual_protocol::{read_frame, write_frame};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::make_connection_handler;
use crate::reactor::Reactor;
use crate::service::SyncService;

/// Unix socket server for front-end connections.
pub struct SocketServer {
    config: ServerConfig,
    listener: UnixListener,
    /// Limits concurrent connections.
    connection_semaphore: Arc<Semaphore>,
}

impl SocketServer {
    /// Binds the socket described by `config`.
    ///
    /// If `cleanup_stale_socket` is set, a leftover socket file that nobody
    /// answers on is removed first. A live socket is never taken over.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let socket_path = &config.socket_path;

        if let Some(parent) = socket_path.parent()
            && !parent.exists()
        {
            return Err(ServerError::socket_path_invalid(
                parent.to_string_lossy().to_string(),
            ));
        }

        if socket_path.exists() {
            if !config.cleanup_stale_socket {
                return Err(ServerError::socket_in_use(
                    socket_path.to_string_lossy().to_string(),
                ));
            }
            if UnixStream::connect(socket_path).await.is_ok() {
                return Err(ServerError::socket_in_use(
                    socket_path.to_string_lossy().to_string(),
                ));
            }
            info!(path = %socket_path.display(), "Removing stale socket");
            std::fs::remove_file(socket_path)?;
        }

        let listener = UnixListener::bind(socket_path)?;
        info!(path = %socket_path.display(), "Socket server listening");

        let connection_semaphore = Arc::new(Semaphore::new(config.max_connections));

        Ok(Self {
            config,
            listener,
            connection_semaphore,
        })
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// Accepts a single connection, waiting for a free slot first.
    pub async fn accept(&self) -> ServerResult<Connection> {
        let permit = Arc::clone(&self.connection_semaphore)
            .acquire_owned()
            .await
            .map_err(|_| ServerError::Shutdown)?;

        let (stream, _addr) = self.listener.accept().await?;
        debug!("Accepted new connection");

        Ok(Connection {
            stream,
            timeout: self.config.connection_timeout,
            _permit: permit,
        })
    }

    /// Runs the accept loop, spawning `handler` for each connection.
    ///
    /// Accept failures are logged and do not stop the loop.
    pub async fn run<F, Fut>(&self, handler: F) -> ServerResult<()>
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        loop {
            match self.accept().await {
                Ok(connection) => {
                    tokio::spawn(handler(connection));
                }
                Err(ServerError::Shutdown) => return Err(ServerError::Shutdown),
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Runs the accept loop until `shutdown` completes.
    pub async fn run_until_shutdown<F, Fut, S>(&self, handler: F, shutdown: S) -> ServerResult<()>
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
        S: Future<Output = ()> + Send,
    {
        tokio::select! {
            result = self.run(handler) => result,
            _ = shutdown => {
                info!("Shutdown signal received");
                Ok(())
            }
        }
    }

    /// Serves `reactor` on every connection until `shutdown` completes.
    pub async fn serve<S, F>(&self, reactor: Arc<Reactor<S>>, shutdown: F) -> ServerResult<()>
    where
        S: SyncService + ?Sized,
        F: Future<Output = ()> + Send,
    {
        self.run_until_shutdown(make_connection_handler(reactor), shutdown)
            .await
    }
}

impl Drop for SocketServer {
    fn drop(&mut self) {
        let path = &self.config.socket_path;
        if !path.exists() {
            return;
        }
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Removed socket file"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove socket file"),
        }
    }
}

/// One front-end connection.
pub struct Connection {
    stream: UnixStream,
    timeout: Duration,
    _permit: OwnedSemaphorePermit,
}

impl Connection {
    /// Reads the next call envelope.
    ///
    /// Returns `Ok(None)` if the front-end closed the connection cleanly.
    pub async fn read_call(&mut self) -> ServerResult<Option<Vec<u8>>> {
        match tokio::time::timeout(self.timeout, read_frame(&mut self.stream)).await {
            Ok(frame) => Ok(frame?),
            Err(_) => Err(ServerError::Timeout {
                operation: "read call",
            }),
        }
    }

    /// Writes one reply envelope.
    pub async fn write_reply(&mut self, reply: &[u8]) -> ServerResult<()> {
        match tokio::time::timeout(self.timeout, write_frame(&mut self.stream, reply)).await {
            Ok(written) => Ok(written?),
            Err(_) => Err(ServerError::Timeout {
                operation: "write reply",
            }),
        }
    }
}
