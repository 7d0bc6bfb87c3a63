use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// The frame delimiter. Present exactly once per message, at the end.
pub const TERMINATOR: u8 = 0;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────────────────┬──────┐
/// │ Payload (UTF-8 document)     │ 0x00 │
/// └──────────────────────────────┴──────┘
/// ```
///
/// The payload must not contain a zero byte, otherwise the receiver would
/// split the message early.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if let Some(offset) = find_terminator(payload) {
        return Err(FrameError::EmbeddedTerminator { offset });
    }
    dst.reserve(payload.len() + 1);
    dst.put_slice(payload);
    dst.put_u8(TERMINATOR);
    Ok(())
}

/// Position of the first terminator in `src`, if any.
pub fn find_terminator(src: &[u8]) -> Option<usize> {
    src.iter().position(|&b| b == TERMINATOR)
}

/// Configuration for the frame reader/writer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
