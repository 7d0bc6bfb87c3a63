use std::io::{ErrorKind, Read};

use bytes::{BufMut, Bytes, BytesMut};
use spiceapi_transport::ApiStream;
use tracing::warn;

use crate::codec::{FrameConfig, TERMINATOR};
use crate::error::{FrameError, Result};
use crate::keystream::Keystream;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads complete zero-terminated frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
/// Nothing is buffered between calls: bytes that arrive after the
/// terminator are dropped without being unmasked.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete frame (blocking), without its terminator.
    ///
    /// Each received byte is unmasked with the next byte of `keystream`, if
    /// one is given, before it is checked for the terminator. The keystream
    /// therefore advances by exactly the frame length plus one.
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached before
    /// the terminator.
    pub fn read_frame(&mut self, mut keystream: Option<&mut Keystream>) -> Result<Bytes> {
        self.buf.clear();
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            for (pos, &raw) in chunk[..read].iter().enumerate() {
                let byte = match keystream.as_mut() {
                    Some(ks) => ks.mask(raw),
                    None => raw,
                };

                if byte == TERMINATOR {
                    let trailing = read - pos - 1;
                    if trailing > 0 {
                        warn!(trailing, "discarding bytes received after frame terminator");
                    }
                    return Ok(self.buf.split().freeze());
                }

                if self.buf.len() >= self.config.max_payload_size {
                    return Err(FrameError::PayloadTooLarge {
                        size: self.buf.len() + 1,
                        max: self.config.max_payload_size,
                    });
                }
                self.buf.put_u8(byte);
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<ApiStream> {
    /// Create a frame reader for `ApiStream` and apply read timeout from config.
    pub fn with_config_api(inner: ApiStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: spiceapi_transport::TransportError) -> FrameError {
    match err {
        spiceapi_transport::TransportError::Io(io) => FrameError::Io(io),
        spiceapi_transport::TransportError::Resolve { source, .. }
        | spiceapi_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
    }
}
