//! The error channel: failures as transportable records.
//!
//! The daemon side turns a [`ServiceError`] (or a framing failure caught
//! before dispatch) into an [`ErrorRecord`] and sends it under the reserved
//! opcode. The front-end side turns the record back into an error value; see
//! `ritual_client::decode_error`.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ProtocolError;
use crate::registry::Opcode;
use crate::types::UnknownFields;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Stable, enumerable kind of a transported error.
///
/// Variants are only ever added. A kind sent by a newer peer decodes as
/// [`ErrorKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown or internal error.
    Internal,
    BadArgs,
    NotFound,
    AlreadyExists,
    NoPermission,
    NotDir,
    NotFile,
    DirectoryNotEmpty,
    NotShared,
    /// The object is excluded from sync on this device.
    Expelled,
    Busy,
    Timeout,
    /// The daemon does not implement the operation.
    Unsupported,
    /// The daemon could not parse the call envelope.
    MalformedEnvelope,
    /// The daemon does not know the call's opcode.
    UnknownOpcode,
    /// A kind this build does not recognize.
    #[serde(other)]
    Unknown,
}

impl ErrorKind {
    /// Returns a human-readable description of the error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Internal => "An internal error occurred",
            Self::BadArgs => "The arguments were invalid",
            Self::NotFound => "No such file or folder",
            Self::AlreadyExists => "The file or folder already exists",
            Self::NoPermission => "Permission denied",
            Self::NotDir => "Not a folder",
            Self::NotFile => "Not a file",
            Self::DirectoryNotEmpty => "The folder is not empty",
            Self::NotShared => "The folder is not shared",
            Self::Expelled => "The object is excluded from sync",
            Self::Busy => "The daemon is busy",
            Self::Timeout => "The operation timed out",
            Self::Unsupported => "The operation is not supported",
            Self::MalformedEnvelope => "The request could not be parsed",
            Self::UnknownOpcode => "The daemon speaks a different protocol version",
            Self::Unknown => "Unrecognized error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Payload of an error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    /// Extra diagnostics, such as the chain of underlying causes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(flatten)]
    pub unknown: UnknownFields,
}

impl ErrorRecord {
    /// Creates a new error record.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            unknown: UnknownFields::default(),
        }
    }

    /// Builder: set detail.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.description(), self.message)
    }
}

impl From<&ProtocolError> for ErrorRecord {
    fn from(err: &ProtocolError) -> Self {
        match err {
            ProtocolError::MalformedEnvelope { reason } => {
                Self::new(ErrorKind::MalformedEnvelope, reason.clone())
            }
            ProtocolError::UnknownOpcode { opcode } => {
                Self::new(ErrorKind::UnknownOpcode, err.to_string())
                    .with_detail(format!("opcode={opcode}"))
            }
            ProtocolError::BadRecord { .. } => Self::new(ErrorKind::BadArgs, err.to_string()),
            _ => Self::new(ErrorKind::Internal, err.to_string()),
        }
    }
}

/// Failure raised by a service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("bad arguments: {0}")]
    BadArgs(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("permission denied: {0}")]
    NoPermission(String),

    #[error("not a folder: {0}")]
    NotDir(String),

    #[error("not a file: {0}")]
    NotFile(String),

    #[error("folder not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("not shared: {0}")]
    NotShared(String),

    #[error("excluded from sync: {0}")]
    Expelled(String),

    #[error("busy: {0}")]
    Busy(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// Anything outside the taxonomy above.
    #[error("internal error: {0}")]
    Internal(#[source] Box<dyn StdError + Send + Sync>),
}

impl ServiceError {
    /// Wraps an arbitrary error as an internal failure.
    pub fn internal(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Internal(err.into())
    }

    /// The failure returned for operations a service does not implement.
    pub fn unsupported(opcode: Opcode) -> Self {
        Self::Unsupported(opcode.name().to_string())
    }

    /// Returns the transported kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadArgs(_) => ErrorKind::BadArgs,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::NoPermission(_) => ErrorKind::NoPermission,
            Self::NotDir(_) => ErrorKind::NotDir,
            Self::NotFile(_) => ErrorKind::NotFile,
            Self::DirectoryNotEmpty(_) => ErrorKind::DirectoryNotEmpty,
            Self::NotShared(_) => ErrorKind::NotShared,
            Self::Expelled(_) => ErrorKind::Expelled,
            Self::Busy(_) => ErrorKind::Busy,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The message as the service raised it, without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            Self::BadArgs(m)
            | Self::NotFound(m)
            | Self::AlreadyExists(m)
            | Self::NoPermission(m)
            | Self::NotDir(m)
            | Self::NotFile(m)
            | Self::DirectoryNotEmpty(m)
            | Self::NotShared(m)
            | Self::Expelled(m)
            | Self::Busy(m)
            | Self::Timeout(m)
            | Self::Unsupported(m) => m.clone(),
            Self::Internal(err) => err.to_string(),
        }
    }
}

/// Converts a service failure into its transportable record.
///
/// Internal errors keep their cause chain in `detail` so nothing is dropped
/// on the way to the front-end.
pub fn encode_error(err: &ServiceError) -> ErrorRecord {
    let record = ErrorRecord::new(err.kind(), err.message());

    let ServiceError::Internal(inner) = err else {
        return record;
    };

    let mut causes = Vec::new();
    let mut source = inner.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }

    if causes.is_empty() {
        record
    } else {
        record.with_detail(causes.join(": "))
    }
}
