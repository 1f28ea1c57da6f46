//! Daemon side of the ritual control plane.
//!
//! A [`SyncService`] implements the operations, a [`Reactor`] turns encoded
//! call envelopes into encoded replies, and a [`SocketServer`] carries them
//! over a Unix socket.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use ritual_server::{Reactor, ServerConfig, SocketServer, SyncService};
//!
//! struct Daemon;
//!
//! #[async_trait]
//! impl SyncService for Daemon {}
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = SocketServer::new(ServerConfig::default()).await?;
//!     let reactor = Arc::new(Reactor::new(Arc::new(Daemon)));
//!     server.serve(reactor, std::future::pending()).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod handler;
mod reactor;
mod service;
mod socket;

pub use config::{SOCKET_FILE_NAME, ServerConfig, default_socket_path};
pub use error::{ServerError, ServerResult};
pub use handler::{handle_connection, make_connection_handler};
pub use reactor::{Reactor, ReactorError, ReactorResult};
pub use service::SyncService;
pub use socket::{Connection, SocketServer};
