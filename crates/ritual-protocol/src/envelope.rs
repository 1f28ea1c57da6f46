//! The `{opcode, payload}` wrapper around every call and reply.

use crate::error::{ProtocolError, ProtocolResult};
use crate::fault::ErrorRecord;
use crate::registry::{self, Call, Opcode, Record};

/// Opcode of error replies. Never assigned to an operation.
pub const RESERVED_ERROR_OPCODE: u32 = 0;

/// Size of the fixed envelope header: opcode plus payload length.
pub const ENVELOPE_HEADER_SIZE: usize = 8;

/// One call, reply or error in flight.
///
/// A decoded envelope keeps the raw opcode so that an unregistered value can
/// still be reported as [`ProtocolError::UnknownOpcode`] by [`Envelope::operation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Operation opcode, or [`RESERVED_ERROR_OPCODE`].
    pub opcode: u32,
    /// Serialized record for `opcode`.
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Wraps an already serialized record.
    pub fn new(opcode: u32, payload: Vec<u8>) -> Self {
        Self { opcode, payload }
    }

    /// Builds a call envelope for `call`.
    pub fn call<C: Call>(call: &C) -> ProtocolResult<Self> {
        Self::with_record(C::OPCODE.as_u32(), call)
    }

    /// Builds a successful reply to `opcode`.
    pub fn reply<R: Record>(opcode: Opcode, reply: &R) -> ProtocolResult<Self> {
        Self::with_record(opcode.as_u32(), reply)
    }

    /// Builds an error reply.
    pub fn error(record: &ErrorRecord) -> ProtocolResult<Self> {
        Self::with_record(RESERVED_ERROR_OPCODE, record)
    }

    fn with_record<R: Record>(opcode: u32, record: &R) -> ProtocolResult<Self> {
        let payload = serde_json::to_vec(record).map_err(ProtocolError::Serialization)?;
        Ok(Self { opcode, payload })
    }

    /// Returns true if this envelope carries an error record.
    pub fn is_error(&self) -> bool {
        self.opcode == RESERVED_ERROR_OPCODE
    }

    /// Resolves the opcode against the registry.
    pub fn operation(&self) -> ProtocolResult<Opcode> {
        registry::resolve(self.opcode).map(|d| d.opcode)
    }

    /// Decodes the payload as `R`.
    pub fn record<R: Record>(&self) -> ProtocolResult<R> {
        serde_json::from_slice(&self.payload).map_err(|source| ProtocolError::BadRecord {
            record: short_type_name::<R>(),
            source,
        })
    }

    /// Encodes the envelope to its wire form.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        let len = u32::try_from(self.payload.len()).map_err(|_| ProtocolError::MessageTooLarge {
            size: self.payload.len(),
            max: u32::MAX as usize,
        })?;

        let mut buffer = Vec::with_capacity(ENVELOPE_HEADER_SIZE + self.payload.len());
        buffer.extend_from_slice(&self.opcode.to_be_bytes());
        buffer.extend_from_slice(&len.to_be_bytes());
        buffer.extend_from_slice(&self.payload);
        Ok(buffer)
    }

    /// Decodes an envelope from its wire form.
    ///
    /// Only the envelope shape is checked here. The opcode is validated by
    /// [`Envelope::operation`] and the payload by [`Envelope::record`].
    pub fn decode(data: &[u8]) -> ProtocolResult<Self> {
        let Some((header, payload)) = data.split_first_chunk::<ENVELOPE_HEADER_SIZE>() else {
            return Err(ProtocolError::malformed(format!(
                "expected at least {ENVELOPE_HEADER_SIZE} header bytes, got {}",
                data.len()
            )));
        };

        let [o0, o1, o2, o3, l0, l1, l2, l3] = *header;
        let opcode = u32::from_be_bytes([o0, o1, o2, o3]);
        let len = u32::from_be_bytes([l0, l1, l2, l3]) as usize;

        if payload.len() != len {
            return Err(ProtocolError::malformed(format!(
                "payload length field says {len} bytes, found {}",
                payload.len()
            )));
        }

        Ok(Self {
            opcode,
            payload: payload.to_vec(),
        })
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
