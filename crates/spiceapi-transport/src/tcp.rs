use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::ApiStream;

/// Default connect and I/O timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Socket options applied when opening a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpOptions {
    /// Timeout for connecting and for each blocking read/write.
    pub timeout: Duration,
    /// Disable Nagle's algorithm.
    pub nodelay: bool,
}

impl Default for TcpOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            nodelay: true,
        }
    }
}

/// Connect to `host:port` (blocking).
///
/// Every resolved address is tried in order; the first one that accepts the
/// connection wins. The returned stream already carries the configured
/// timeouts and `TCP_NODELAY` setting.
pub fn connect(host: &str, port: u16, options: &TcpOptions) -> Result<ApiStream> {
    let addrs: Vec<_> = (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            host: host.to_string(),
            port,
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(TransportError::Resolve {
            host: host.to_string(),
            port,
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no addresses resolved",
            ),
        });
    }

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, options.timeout) {
            Ok(stream) => {
                let stream = ApiStream::from_tcp(stream);
                stream.set_nodelay(options.nodelay)?;
                stream.set_read_timeout(Some(options.timeout))?;
                stream.set_write_timeout(Some(options.timeout))?;
                info!(%addr, "connected");
                return Ok(stream);
            }
            Err(err) => {
                debug!(%addr, %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    Err(TransportError::Connect {
        host: host.to_string(),
        port,
        source: last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "no address accepted")
        }),
    })
}
