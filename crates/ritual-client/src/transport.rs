//! The byte channel a [`Stub`](crate::Stub) sends envelopes over.

use std::sync::Arc;

use async_trait::async_trait;

use ritual_server::{Reactor, SyncService};

use crate::error::{ClientError, ClientResult};

/// Delivers one encoded call envelope and yields the encoded reply.
///
/// Implementations carry one call at a time per channel; the reply returned
/// must be the one produced for `request`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Vec<u8>) -> ClientResult<Vec<u8>>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: Vec<u8>) -> ClientResult<Vec<u8>> {
        (**self).send(request).await
    }
}

/// Hands envelopes straight to a [`Reactor`] in the same process.
pub struct InProcessTransport<S: ?Sized> {
    reactor: Reactor<S>,
}

impl<S> InProcessTransport<S>
where
    S: SyncService + ?Sized,
{
    pub fn new(reactor: Reactor<S>) -> Self {
        Self { reactor }
    }

    /// Wraps `service` in a fresh reactor.
    pub fn for_service(service: Arc<S>) -> Self {
        Self::new(Reactor::new(service))
    }
}

#[async_trait]
impl<S> Transport for InProcessTransport<S>
where
    S: SyncService + ?Sized,
{
    async fn send(&self, request: Vec<u8>) -> ClientResult<Vec<u8>> {
        // A socket server would drop the connection here.
        self.reactor
            .react(&request)
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))
    }
}
