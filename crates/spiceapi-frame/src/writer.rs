use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use spiceapi_transport::ApiStream;

use crate::codec::{encode_frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::keystream::Keystream;
use crate::reader::transport_to_frame_error;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete zero-terminated frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Frame, mask and send a payload (blocking).
    ///
    /// The terminator is appended before masking, so it consumes a keystream
    /// byte like every other byte of the frame.
    pub fn send(&mut self, payload: &[u8], keystream: Option<&mut Keystream>) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        encode_frame(payload, &mut self.buf)?;
        if let Some(ks) = keystream {
            ks.apply(&mut self.buf);
        }

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<ApiStream> {
    /// Create a frame writer for `ApiStream` and apply write timeout from config.
    pub fn with_config_api(inner: ApiStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn written(writer: FrameWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        writer.into_inner().into_inner()
    }

    #[test]
    fn write_plain_frame() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(b"{\"id\":7}", None).unwrap();
        assert_eq!(written(writer), b"{\"id\":7}\0");
    }

    #[test]
    fn write_masked_frame_includes_terminator() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        let mut ks = Keystream::from_password("debug").unwrap();
        writer.send(b"hi", Some(&mut ks)).unwrap();

        let mut wire = written(writer);
        Keystream::from_password("debug").unwrap().apply(&mut wire);
        assert_eq!(wire, b"hi\0");
    }

    #[test]
    fn keystream_continues_across_frames() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        let mut ks = Keystream::from_password("debug").unwrap();
        writer.send(b"a", Some(&mut ks)).unwrap();
        writer.send(b"b", Some(&mut ks)).unwrap();

        let mut wire = written(writer);
        Keystream::from_password("debug").unwrap().apply(&mut wire);
        assert_eq!(wire, b"a\0b\0");
    }

    #[test]
    fn rejects_embedded_terminator_without_touching_keystream() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        let mut ks = Keystream::from_password("debug").unwrap();
        let err = writer.send(b"a\0b", Some(&mut ks)).unwrap_err();
        assert!(matches!(err, FrameError::EmbeddedTerminator { offset: 1 }));

        let mut reference = Keystream::from_password("debug").unwrap();
        assert_eq!(ks.next_byte(), reference.next_byte());
        assert!(written(writer).is_empty());
    }

    #[test]
    fn rejects_oversized_payload() {
        let cfg = FrameConfig {
            max_payload_size: 2,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(Cursor::new(Vec::<u8>::new()), cfg);
        let err = writer.send(b"abc", None).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 3, max: 2 }));
    }

    #[test]
    fn zero_length_write_reports_closed() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(b"x", None).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn short_writes_are_completed() {
        let mut writer = FrameWriter::new(OneByteWriter { out: Vec::new() });
        writer.send(b"chunked", None).unwrap();
        assert_eq!(writer.into_inner().out, b"chunked\0");
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct OneByteWriter {
        out: Vec<u8>,
    }

    impl Write for OneByteWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            match buf.first() {
                Some(&b) => {
                    self.out.push(b);
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
