//! Front-end side of the ritual control plane.
//!
//! A [`Stub`] turns typed method calls into envelopes and sends them over a
//! [`Transport`]; [`SocketTransport`] talks to the daemon's Unix socket.
//!
//! ```rust,no_run
//! use ritual_client::{ClientConfig, SocketTransport, Stub};
//!
//! # async fn run() -> ritual_client::ClientResult<()> {
//! let config = ClientConfig::load_from("/etc/ritual/client.toml")?;
//! let stub = Stub::new(SocketTransport::from_config(&config));
//!
//! stub.create_object("/a/b", true).await?;
//! for child in stub.get_children_attributes("/a").await? {
//!     println!("{}", child.name);
//! }
//! # Ok(())
//! # }
//! ```

mod blocking;
mod config;
mod error;
mod socket;
mod stub;
mod transport;

pub use blocking::BlockingStub;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, RemoteError, decode_error};
pub use socket::SocketTransport;
pub use stub::Stub;
pub use transport::{InProcessTransport, Transport};
