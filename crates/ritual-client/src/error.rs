//! Client error types and decoding of transported errors.

use std::fmt;
use std::io;

use thiserror::Error;

use ritual_protocol::{ErrorKind, ErrorRecord, ProtocolError};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// A failure raised by the daemon's service, as transported.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    pub kind: ErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The daemon ran the call and it failed.
    #[error(transparent)]
    Remote(RemoteError),

    /// The daemon does not know the operation: the two sides run different
    /// protocol versions.
    #[error("daemon speaks a different protocol version: {message}")]
    UnknownOpcode { message: String },

    /// The daemon could not parse what was sent.
    #[error("daemon rejected a malformed call: {message}")]
    RemoteMalformed { message: String },

    /// The daemon reported an error kind this build does not know.
    #[error("unrecognized daemon error: {message}")]
    Unrecognized { message: String },

    /// A successful reply carried another operation's opcode.
    #[error("unexpected response code {received}, expected {expected}")]
    ProtocolMismatch { expected: u32, received: u32 },

    /// The call could not be encoded, or the reply could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Connection to the daemon failed or was lost.
    #[error("connection error: {0}")]
    Connection(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Gave up waiting locally; the daemon may still complete the call.
    #[error("timed out {0}")]
    Timeout(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns the transported kind for errors raised by the service.
    pub fn remote_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Remote(remote) => Some(remote.kind),
            _ => None,
        }
    }

    /// Returns true if the call was abandoned by a local timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns true if the failure points at mismatched protocol versions.
    pub fn is_version_skew(&self) -> bool {
        matches!(
            self,
            Self::UnknownOpcode { .. } | Self::ProtocolMismatch { .. }
        )
    }
}

/// Turns a transported error record back into an error value.
pub fn decode_error(record: ErrorRecord) -> ClientError {
    let ErrorRecord {
        kind,
        message,
        detail,
        ..
    } = record;

    match kind {
        ErrorKind::UnknownOpcode => ClientError::UnknownOpcode { message },
        ErrorKind::MalformedEnvelope => ClientError::RemoteMalformed { message },
        ErrorKind::Unknown => ClientError::Unrecognized { message },
        kind => ClientError::Remote(RemoteError {
            kind,
            message,
            detail,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_become_remote_errors() {
        let record = ErrorRecord::new(ErrorKind::NotFound, "/missing").with_detail("no such row");
        match decode_error(record) {
            ClientError::Remote(remote) => {
                assert_eq!(remote.kind, ErrorKind::NotFound);
                assert_eq!(remote.message, "/missing");
                assert_eq!(remote.detail.as_deref(), Some("no such row"));
            }
            other => panic!("expected a remote error, got {other:?}"),
        }
    }

    #[test]
    fn framing_kinds_get_their_own_variants() {
        let skew = decode_error(ErrorRecord::new(ErrorKind::UnknownOpcode, "opcode 200"));
        assert!(matches!(skew, ClientError::UnknownOpcode { .. }));
        assert!(skew.is_version_skew());

        let malformed = decode_error(ErrorRecord::new(ErrorKind::MalformedEnvelope, "short"));
        assert!(matches!(malformed, ClientError::RemoteMalformed { message } if message == "short"));
    }

    #[test]
    fn unknown_kind_keeps_its_message() {
        let record: ErrorRecord =
            record_from_json(r#"{"kind":"quota_exceeded","message":"over quota"}"#);
        let err = decode_error(record);
        assert!(matches!(&err, ClientError::Unrecognized { message } if message == "over quota"));
        assert_eq!(err.remote_kind(), None);
    }

    #[test]
    fn display_texts() {
        let mismatch = ClientError::ProtocolMismatch {
            expected: 4,
            received: 5,
        };
        assert_eq!(mismatch.to_string(), "unexpected response code 5, expected 4");

        let remote = decode_error(ErrorRecord::new(ErrorKind::NoPermission, "/team"));
        assert_eq!(remote.to_string(), "Permission denied: /team");
        assert_eq!(remote.remote_kind(), Some(ErrorKind::NoPermission));
        assert!(!remote.is_timeout());
    }

    fn record_from_json(json: &str) -> ErrorRecord {
        use ritual_protocol::Envelope;
        Envelope::new(0, json.as_bytes().to_vec()).record().unwrap()
    }
}
