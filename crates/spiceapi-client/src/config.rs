use std::fmt;
use std::time::Duration;

use spiceapi_frame::DEFAULT_MAX_PAYLOAD;
use spiceapi_transport::DEFAULT_TIMEOUT;

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default server port.
pub const DEFAULT_PORT: u16 = 1337;

/// Configuration accepted by a [`Connection`](crate::Connection).
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Server host name or address.
    pub host: String,
    /// Server TCP port.
    pub port: u16,
    /// Password used to key the cipher right after connecting.
    /// Empty means plaintext until a session refresh supplies one.
    /// Treated as credential material and redacted in debug output.
    pub password: String,
    /// Run the session-refresh handshake on every (re)connect.
    pub refresh_session: bool,
    /// Connect timeout and per-operation read/write timeout.
    pub timeout: Duration,
    /// Largest response payload accepted, in bytes.
    pub max_payload_size: usize,
}

impl ConnectionConfig {
    /// Configuration for `host:port` with all other settings at their defaults.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_refresh_session(mut self, refresh_session: bool) -> Self {
        self.refresh_session = refresh_session;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_payload_size(mut self, max_payload_size: usize) -> Self {
        self.max_payload_size = max_payload_size;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            password: String::new(),
            refresh_session: true,
            timeout: DEFAULT_TIMEOUT,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("ConnectionConfig");
        dbg.field("host", &self.host).field("port", &self.port);
        if self.password.is_empty() {
            dbg.field("password", &"");
        } else {
            dbg.field(
                "password",
                &format_args!("<redacted:{} bytes>", self.password.len()),
            );
        }
        dbg.field("refresh_session", &self.refresh_session)
            .field("timeout", &self.timeout)
            .field("max_payload_size", &self.max_payload_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ConnectionConfig::default();
        assert_eq!(cfg.host, "localhost");
        assert_eq!(cfg.port, 1337);
        assert!(cfg.password.is_empty());
        assert!(cfg.refresh_session);
        assert_eq!(cfg.timeout, Duration::from_secs(3));
    }

    #[test]
    fn builder_methods() {
        let cfg = ConnectionConfig::new("10.0.0.2", 4000)
            .with_password("changeme")
            .with_refresh_session(false)
            .with_timeout(Duration::from_millis(500));
        assert_eq!(cfg.host, "10.0.0.2");
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.password, "changeme");
        assert!(!cfg.refresh_session);
        assert_eq!(cfg.timeout, Duration::from_millis(500));
    }

    #[test]
    fn debug_redacts_password() {
        let cfg = ConnectionConfig::default().with_password("changeme");
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("changeme"));
        assert!(rendered.contains("<redacted:8 bytes>"));
    }
}
