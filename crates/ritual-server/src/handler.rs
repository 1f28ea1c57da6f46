//! Per-connection call loop.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use ritual_protocol::{Envelope, ErrorKind, ErrorRecord, MAX_MESSAGE_SIZE};
use tracing::{debug, error, warn};

use crate::error::{ServerError, ServerResult};
use crate::reactor::Reactor;
use crate::service::SyncService;
use crate::socket::Connection;

/// Answers calls on `conn` one at a time until the front-end disconnects.
///
/// The next frame is not read before the reply to the previous one has been
/// written, so replies leave in call order.
pub async fn handle_connection<S>(reactor: &Reactor<S>, mut conn: Connection) -> ServerResult<()>
where
    S: SyncService + ?Sized,
{
    loop {
        let Some(call) = conn.read_call().await? else {
            debug!("Client disconnected");
            return Ok(());
        };
        let reply = reactor.react(&call).await?;
        if reply.len() > MAX_MESSAGE_SIZE as usize {
            conn.write_reply(&oversized_reply(reply.len())?).await?;
            continue;
        }
        conn.write_reply(&reply).await?;
    }
}

/// Error reply sent in place of a reply that does not fit in one frame.
fn oversized_reply(len: usize) -> ServerResult<Vec<u8>> {
    warn!(size = len, max = MAX_MESSAGE_SIZE, "Reply exceeds frame limit");
    let record = ErrorRecord::new(
        ErrorKind::Internal,
        format!("reply too large: {len} bytes (max: {MAX_MESSAGE_SIZE})"),
    );
    Ok(Envelope::error(&record)?.encode()?)
}

/// Builds a connection handler for [`SocketServer::run`](crate::SocketServer::run).
pub fn make_connection_handler<S>(
    reactor: Arc<Reactor<S>>,
) -> impl Fn(Connection) -> BoxFuture<'static, ()> + Send + Sync + 'static
where
    S: SyncService + ?Sized,
{
    move |conn| {
        let reactor = Arc::clone(&reactor);
        Box::pin(async move {
            match handle_connection(&reactor, conn).await {
                Ok(()) => {}
                Err(ServerError::Timeout { operation }) => {
                    debug!(operation, "Closing idle connection");
                }
                Err(ServerError::Reactor(e)) => {
                    error!(error = %e, "Closing connection after unanswerable call");
                }
                Err(e) => warn!(error = %e, "Connection handler error"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::socket::SocketServer;
    use async_trait::async_trait;
    use ritual_protocol::{
        ChildAttributes, CreateObjectCall, Empty, GetChildrenAttributesCall, HeartbeatCall,
        ObjectPath, Opcode, ServiceResult, read_frame, write_frame,
    };
    use std::sync::Mutex;
    use tempfile::tempdir;
    use tokio::net::UnixStream;

    #[derive(Default)]
    struct Creator {
        created: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SyncService for Creator {
        async fn create_object(&self, path: ObjectPath, _dir: bool) -> ServiceResult<()> {
            self.created.lock().unwrap().push(path.to_string());
            Ok(())
        }

        async fn get_children_attributes(
            &self,
            _path: ObjectPath,
        ) -> ServiceResult<Vec<ChildAttributes>> {
            // Roughly 20 MiB of JSON, past the frame limit.
            let name = "x".repeat(1024);
            Ok((0..20_000)
                .map(|_| ChildAttributes {
                    name: name.clone(),
                    ..Default::default()
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn calls_are_answered_in_order() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("ritual.sock");
        let server = SocketServer::new(ServerConfig::new(&socket_path))
            .await
            .unwrap();

        let service = Arc::new(Creator::default());
        let reactor = Reactor::new(Arc::clone(&service));

        let client = tokio::spawn(async move {
            let mut stream = UnixStream::connect(&socket_path).await.unwrap();
            let first = Envelope::call(&CreateObjectCall::new("/one", false)).unwrap();
            let unknown = Envelope::new(200, b"{}".to_vec());
            write_frame(&mut stream, &first.encode().unwrap()).await.unwrap();
            write_frame(&mut stream, &unknown.encode().unwrap()).await.unwrap();

            let mut replies = Vec::new();
            for _ in 0..2 {
                let frame = read_frame(&mut stream).await.unwrap().unwrap();
                replies.push(Envelope::decode(&frame).unwrap());
            }
            replies
        });

        let conn = server.accept().await.unwrap();
        let handled = tokio::spawn(async move { handle_connection(&reactor, conn).await });

        let replies = client.await.unwrap();
        assert_eq!(replies[0].operation().unwrap(), Opcode::CreateObject);
        assert_eq!(replies[0].record::<Empty>().unwrap(), Empty::default());
        assert!(replies[1].is_error());
        let record: ErrorRecord = replies[1].record().unwrap();
        assert_eq!(record.kind, ErrorKind::UnknownOpcode);

        handled.await.unwrap().unwrap();
        assert_eq!(*service.created.lock().unwrap(), ["/one"]);
    }

    #[tokio::test]
    async fn framing_error_ends_the_connection() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("ritual.sock");
        let server = SocketServer::new(ServerConfig::new(&socket_path))
            .await
            .unwrap();
        let reactor = Reactor::new(Arc::new(Creator::default()));

        let client = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            let mut stream = UnixStream::connect(&socket_path).await.unwrap();
            stream.write_all(&[0, 0, 0, 0]).await.unwrap();
            stream
        });

        let conn = server.accept().await.unwrap();
        let _stream = client.await.unwrap();

        assert!(matches!(
            handle_connection(&reactor, conn).await,
            Err(ServerError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn oversized_reply_becomes_error_reply() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("ritual.sock");
        let server = SocketServer::new(ServerConfig::new(&socket_path))
            .await
            .unwrap();
        let reactor = Reactor::new(Arc::new(Creator::default()));

        let client = tokio::spawn(async move {
            let mut stream = UnixStream::connect(&socket_path).await.unwrap();
            let listing = Envelope::call(&GetChildrenAttributesCall::new("/big")).unwrap();
            let heartbeat = Envelope::call(&HeartbeatCall::default()).unwrap();

            let mut replies = Vec::new();
            for call in [listing, heartbeat] {
                write_frame(&mut stream, &call.encode().unwrap()).await.unwrap();
                let frame = read_frame(&mut stream).await.unwrap().unwrap();
                replies.push(Envelope::decode(&frame).unwrap());
            }
            replies
        });

        let conn = server.accept().await.unwrap();
        let handled = tokio::spawn(async move { handle_connection(&reactor, conn).await });

        let replies = client.await.unwrap();
        assert!(replies[0].is_error());
        let record: ErrorRecord = replies[0].record().unwrap();
        assert_eq!(record.kind, ErrorKind::Internal);
        assert!(record.message.starts_with("reply too large"), "{}", record.message);

        // The connection survives and keeps answering.
        assert_eq!(replies[1].operation().unwrap(), Opcode::Heartbeat);
        handled.await.unwrap().unwrap();
    }
}
