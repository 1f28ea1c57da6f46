//! Length-prefixed framing for stream transports.
//!
//! A stream socket carries one encoded [`Envelope`](crate::Envelope) per
//! frame:
//!
//! ```text
//! +----------------+------------------+
//! | length (4 BE)  |  envelope bytes  |
//! +----------------+------------------+
//! ```

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::MAX_MESSAGE_SIZE;
use crate::error::{ProtocolError, ProtocolResult};

/// Size of the frame length prefix.
pub const FRAME_HEADER_SIZE: usize = 4;

/// Prefixes `envelope` with its length.
pub fn encode_frame(envelope: &[u8]) -> ProtocolResult<Vec<u8>> {
    let len = checked_len(envelope.len())?;

    let mut buffer = Vec::with_capacity(FRAME_HEADER_SIZE + envelope.len());
    buffer.extend_from_slice(&len.to_be_bytes());
    buffer.extend_from_slice(envelope);
    Ok(buffer)
}

/// Reads one frame, returning the envelope bytes it carries.
///
/// Returns `Ok(None)` if the stream ends before the first length byte. A
/// stream that ends inside the length prefix or the envelope is an
/// [`ProtocolError::Io`] error.
pub async fn read_frame<R>(reader: &mut R) -> ProtocolResult<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; FRAME_HEADER_SIZE];
    if reader.read(&mut len_buf[..1]).await? == 0 {
        return Ok(None);
    }
    reader.read_exact(&mut len_buf[1..]).await?;

    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len as usize,
            max: MAX_MESSAGE_SIZE as usize,
        });
    }
    if len == 0 {
        return Err(ProtocolError::EmptyMessage);
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

/// Writes `envelope` as one frame and flushes.
pub async fn write_frame<W>(writer: &mut W, envelope: &[u8]) -> ProtocolResult<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(envelope)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

fn checked_len(len: usize) -> ProtocolResult<u32> {
    match u32::try_from(len) {
        Ok(len) if len == 0 => Err(ProtocolError::EmptyMessage),
        Ok(len) if len <= MAX_MESSAGE_SIZE => Ok(len),
        _ => Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE as usize,
        }),
    }
}
