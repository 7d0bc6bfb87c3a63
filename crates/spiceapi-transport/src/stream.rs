use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::Result;

/// A connected API stream. Implements Read + Write.
///
/// Wraps a blocking TCP stream. Reads and writes go straight to the socket;
/// there is no buffering at this layer.
pub struct ApiStream {
    inner: TcpStream,
}

impl Read for ApiStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for ApiStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl ApiStream {
    /// Wrap an already connected TCP stream.
    pub fn from_tcp(stream: TcpStream) -> Self {
        Self { inner: stream }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Enable or disable Nagle's algorithm.
    pub fn set_nodelay(&self, nodelay: bool) -> Result<()> {
        self.inner.set_nodelay(nodelay).map_err(Into::into)
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self::from_tcp(cloned))
    }

    /// Ask the kernel to acknowledge incoming segments immediately (Linux only).
    ///
    /// The flag is not sticky, so it is re-armed around every send and
    /// receive. Failures are ignored; the hint only affects latency.
    #[cfg(target_os = "linux")]
    pub fn quick_ack(&self) {
        use std::os::fd::AsRawFd;

        let fd = self.inner.as_raw_fd();
        let enable: libc::c_int = 1;

        // SAFETY: `enable` is a valid readable c_int for the given length, and `fd`
        // is an open TCP socket descriptor owned by this stream.
        let rc = unsafe {
            libc::setsockopt(
                fd,
                libc::IPPROTO_TCP,
                libc::TCP_QUICKACK,
                (&enable as *const libc::c_int).cast::<libc::c_void>(),
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if rc != 0 {
            debug!("TCP_QUICKACK not applied");
        }
    }

    /// Ask the kernel to acknowledge incoming segments immediately.
    ///
    /// No-op on platforms without `TCP_QUICKACK`.
    #[cfg(not(target_os = "linux"))]
    pub fn quick_ack(&self) {}

    /// Create a handle that can shut this stream down from another thread.
    pub fn close_handle(&self) -> Result<CloseHandle> {
        let cloned = self.inner.try_clone()?;
        Ok(CloseHandle {
            inner: Arc::new(cloned),
        })
    }
}

impl std::fmt::Debug for ApiStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("ApiStream");
        dbg.field("type", &"tcp");
        if let Ok(addr) = self.inner.peer_addr() {
            dbg.field("peer", &addr);
        }
        dbg.finish()
    }
}

/// Cross-thread interruption handle for an [`ApiStream`].
///
/// Shutting the socket down makes a blocked read on the owning stream
/// return end-of-stream.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    inner: Arc<TcpStream>,
}

impl CloseHandle {
    /// Shut the socket down. Calling this on an already closed socket is not an error.
    pub fn shutdown(&self) {
        match self.inner.shutdown(Shutdown::Both) {
            Ok(()) => debug!("socket shut down via close handle"),
            Err(err) => debug!(%err, "close handle shutdown ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    fn pair() -> (ApiStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (ApiStream::from_tcp(client), server)
    }

    #[test]
    fn read_write_passthrough() {
        let (mut client, mut server) = pair();

        client.write_all(b"ping").unwrap();
        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");

        server.write_all(b"pong").unwrap();
        client.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"pong");
    }

    #[test]
    fn close_handle_unblocks_reader() {
        let (mut client, _server) = pair();
        let handle = client.close_handle().unwrap();

        let reader = std::thread::spawn(move || {
            let mut buf = [0u8; 16];
            client.read(&mut buf)
        });

        std::thread::sleep(Duration::from_millis(50));
        handle.shutdown();

        let read = reader.join().unwrap().unwrap();
        assert_eq!(read, 0);
    }

    #[test]
    fn shutdown_twice_via_handle_is_harmless() {
        let (client, _server) = pair();
        let handle = client.close_handle().unwrap();
        handle.shutdown();
        handle.shutdown();
    }

    #[test]
    fn quick_ack_does_not_disturb_stream() {
        let (mut client, mut server) = pair();
        client.quick_ack();
        client.write_all(b"x").unwrap();
        let mut buf = [0u8; 1];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"x");
    }

    #[test]
    fn debug_includes_peer() {
        let (client, _server) = pair();
        let rendered = format!("{client:?}");
        assert!(rendered.contains("tcp"));
        assert!(rendered.contains("127.0.0.1"));
    }
}
