//! Synchronous wrapper for front-ends without an async runtime.

use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

use ritual_protocol::Call;

use crate::error::ClientResult;
use crate::stub::Stub;
use crate::transport::Transport;

/// Blocks the calling thread on each call.
///
/// Owns a current-thread runtime, so it must not be used from inside another
/// tokio runtime.
pub struct BlockingStub<T> {
    stub: Stub<T>,
    runtime: Runtime,
}

impl<T: Transport> BlockingStub<T> {
    pub fn new(transport: T) -> ClientResult<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            stub: Stub::new(transport),
            runtime,
        })
    }

    /// Returns the async stub calls are made through.
    pub fn stub(&self) -> &Stub<T> {
        &self.stub
    }

    /// Invokes the operation `C` is bound to, waiting at most `timeout`.
    ///
    /// A timeout returns [`ClientError::Timeout`](crate::ClientError::Timeout)
    /// and abandons the call locally only.
    pub fn call<C: Call>(&self, call: C, timeout: Option<Duration>) -> ClientResult<C::Reply> {
        match timeout {
            Some(timeout) => self
                .runtime
                .block_on(self.stub.call_with_timeout(call, timeout)),
            None => self.runtime.block_on(self.stub.call(call)),
        }
    }

    /// Runs any async stub method to completion.
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, decode_error};
    use async_trait::async_trait;
    use ritual_protocol::{
        Empty, Envelope, ErrorKind, ErrorRecord, HeartbeatCall, Opcode, ShutdownCall,
    };

    /// Replies to heartbeat after a delay and fails everything else.
    struct Sleepy {
        delay: Duration,
    }

    #[async_trait]
    impl Transport for Sleepy {
        async fn send(&self, request: Vec<u8>) -> ClientResult<Vec<u8>> {
            let request = Envelope::decode(&request)?;
            if request.operation()? != Opcode::Heartbeat {
                let record = ErrorRecord::new(ErrorKind::Busy, "try later");
                return Ok(Envelope::error(&record)?.encode()?);
            }
            tokio::time::sleep(self.delay).await;
            Ok(Envelope::reply(Opcode::Heartbeat, &Empty::default())?.encode()?)
        }
    }

    #[test]
    fn call_without_timeout_completes() {
        let stub = BlockingStub::new(Sleepy {
            delay: Duration::from_millis(10),
        })
        .unwrap();

        assert_eq!(stub.call(HeartbeatCall::default(), None).unwrap(), Empty::default());
    }

    #[test]
    fn timeout_is_distinct_from_remote_errors() {
        let stub = BlockingStub::new(Sleepy {
            delay: Duration::from_secs(30),
        })
        .unwrap();

        let timed_out = stub
            .call(HeartbeatCall::default(), Some(Duration::from_millis(20)))
            .unwrap_err();
        assert!(timed_out.is_timeout());
        assert_eq!(timed_out.remote_kind(), None);

        let remote = stub
            .call(ShutdownCall::default(), Some(Duration::from_secs(5)))
            .unwrap_err();
        assert!(!remote.is_timeout());
        assert_eq!(remote.remote_kind(), Some(ErrorKind::Busy));
    }

    #[test]
    fn async_methods_run_through_block_on() {
        let stub = BlockingStub::new(Sleepy {
            delay: Duration::ZERO,
        })
        .unwrap();

        stub.block_on(stub.stub().heartbeat()).unwrap();
        let err = stub.block_on(stub.stub().pause_syncing()).unwrap_err();
        assert!(matches!(err, ClientError::Remote(_)));
        assert_eq!(
            err.to_string(),
            decode_error(ErrorRecord::new(ErrorKind::Busy, "try later")).to_string()
        );
    }
}
