//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while encoding or decoding envelopes, records and frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The bytes do not have the envelope shape.
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    /// The opcode is not in this build's registry.
    #[error("unknown opcode {opcode}: peer speaks a different protocol version")]
    UnknownOpcode { opcode: u32 },

    /// The envelope parsed but its record did not match the expected type.
    #[error("bad {record} record: {source}")]
    BadRecord {
        record: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Message exceeds maximum allowed size.
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// Zero-length frame received.
    #[error("empty message")]
    EmptyMessage,

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            reason: reason.into(),
        }
    }

    /// Returns true for errors caused by version skew rather than corruption.
    pub fn is_version_skew(&self) -> bool {
        matches!(self, Self::UnknownOpcode { .. })
    }
}
