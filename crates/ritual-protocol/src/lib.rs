//! Control-plane protocol between the ritual sync daemon and its front-ends.
//!
//! Every call and every reply travels as an [`Envelope`]: an integer opcode
//! naming the operation plus the serialized record for that operation.
//!
//! # Wire Format
//!
//! ```text
//! +---------------+---------------+----------------------+
//! | opcode (4 BE) | length (4 BE) | record bytes (JSON)  |
//! +---------------+---------------+----------------------+
//! ```
//!
//! Opcode `0` is reserved for error replies, whose record is an
//! [`ErrorRecord`]. All other opcodes come from the append-only
//! [`REGISTRY`].
//!
//! Socket transports additionally wrap each envelope in a length-prefixed
//! frame, see [`read_frame`] and [`write_frame`].
//!
//! # Example
//!
//! ```rust
//! use ritual_protocol::{CreateObjectCall, Envelope, Opcode};
//!
//! let call = CreateObjectCall::new("/a/b", true);
//! let bytes = Envelope::call(&call).unwrap().encode().unwrap();
//!
//! let decoded = Envelope::decode(&bytes).unwrap();
//! assert_eq!(decoded.operation().unwrap(), Opcode::CreateObject);
//! assert_eq!(decoded.record::<CreateObjectCall>().unwrap(), call);
//! ```

mod calls;
mod envelope;
mod error;
mod fault;
mod framing;
mod registry;
mod types;

pub use calls::*;
pub use envelope::{Envelope, ENVELOPE_HEADER_SIZE, RESERVED_ERROR_OPCODE};
pub use error::{ProtocolError, ProtocolResult};
pub use fault::{encode_error, ErrorKind, ErrorRecord, ServiceError, ServiceResult};
pub use framing::{encode_frame, read_frame, write_frame, FRAME_HEADER_SIZE};
pub use registry::{resolve, resolve_name, Call, Opcode, OperationDescriptor, Record, REGISTRY};
pub use types::{
    Activity, Branch, ChildAttributes, ConflictedPath, DeviceSyncStatus, DiagnosticsReport,
    Invitation, ObjectAttributes, ObjectPath, ObjectType, PathStatus, RevChild, Revision, Role,
    SharedFolder, StatEntry, SubjectPermissions, SyncState, TransportDiagnostics, UnknownFields,
};

/// Maximum frame size accepted by socket transports (16 MiB).
pub const MAX_MESSAGE_SIZE: u32 = 16 * 1024 * 1024;
