use std::sync::Arc;

use spiceapi_frame::{FrameConfig, FrameReader, FrameWriter, Keystream};
use spiceapi_transport::{ApiStream, CloseHandle, TcpOptions};
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::control;
use crate::error::{ClientError, Result};
use crate::ids::IdAllocator;
use crate::request::Request;
use crate::response::Response;

/// Lifecycle state of a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket is open.
    Disconnected,
    /// A socket is open and the session handshake is in progress.
    Connecting,
    /// The connection is ready for requests.
    Ready,
}

struct Session {
    reader: FrameReader<ApiStream>,
    writer: FrameWriter<ApiStream>,
    close: CloseHandle,
}

impl Session {
    fn open(config: &ConnectionConfig) -> Result<Self> {
        let options = TcpOptions {
            timeout: config.timeout,
            nodelay: true,
        };
        let stream = spiceapi_transport::connect(&config.host, config.port, &options)?;
        let close = stream.close_handle()?;
        let reader_stream = stream.try_clone()?;

        let frame_config = FrameConfig {
            max_payload_size: config.max_payload_size,
            read_timeout: Some(config.timeout),
            write_timeout: Some(config.timeout),
        };
        let reader = FrameReader::with_config_api(reader_stream, frame_config.clone())?;
        let writer = FrameWriter::with_config_api(stream, frame_config)?;

        Ok(Self {
            reader,
            writer,
            close,
        })
    }
}

/// A single client connection to an API server.
///
/// One socket and one keystream. The keystream position is shared by both
/// directions: every byte sent and every byte received advances it, and it
/// is only reset by [`Connection::set_password`].
///
/// Not meant for concurrent use; every exchange takes `&mut self`.
pub struct Connection {
    config: ConnectionConfig,
    ids: Arc<IdAllocator>,
    session: Option<Session>,
    keystream: Option<Keystream>,
    state: ConnectionState,
}

impl Connection {
    /// Create a disconnected connection. Nothing is opened until
    /// [`Connection::reconnect`] is called.
    pub fn new(config: ConnectionConfig, ids: Arc<IdAllocator>) -> Self {
        Self {
            config,
            ids,
            session: None,
            keystream: None,
            state: ConnectionState::Disconnected,
        }
    }

    /// Connect with a private ID allocator.
    ///
    /// Runs the session refresh when `config.refresh_session` is set.
    pub fn connect(config: ConnectionConfig) -> Result<Self> {
        Self::connect_with_ids(config, Arc::new(IdAllocator::new()))
    }

    /// Connect using a shared ID allocator.
    pub fn connect_with_ids(config: ConnectionConfig, ids: Arc<IdAllocator>) -> Result<Self> {
        let mut conn = Self::new(config, ids);
        let refresh = conn.config.refresh_session;
        conn.reconnect(refresh)?;
        Ok(conn)
    }

    /// Close any open socket and open a fresh one.
    ///
    /// The configured password is applied again, so a previous session
    /// password does not carry over. With `perform_handshake` the session
    /// refresh runs immediately, using the fixed ID
    /// [`control::SESSION_REFRESH_ID`]. On any failure the socket is closed
    /// and the error returned.
    pub fn reconnect(&mut self, perform_handshake: bool) -> Result<()> {
        self.close();
        self.state = ConnectionState::Connecting;

        let session = match Session::open(&self.config) {
            Ok(session) => session,
            Err(err) => {
                self.state = ConnectionState::Disconnected;
                return Err(err);
            }
        };
        self.session = Some(session);

        let password = self.config.password.clone();
        self.set_password(&password);

        if perform_handshake {
            if let Err(err) = control::session_refresh(self) {
                warn!(%err, "session refresh failed");
                self.close();
                return Err(err);
            }
        }

        self.state = ConnectionState::Ready;
        info!(
            host = %self.config.host,
            port = self.config.port,
            encrypted = self.keystream.is_some(),
            "connection ready"
        );
        Ok(())
    }

    /// Replace the keystream.
    ///
    /// A non-empty password starts a fresh keystream keyed with its UTF-8
    /// bytes; an empty one switches to plaintext. Applies to every byte sent
    /// or received afterwards. The configured password is left untouched.
    pub fn set_password(&mut self, password: &str) {
        self.keystream = Keystream::from_password(password);
        debug!(encrypted = self.keystream.is_some(), "keystream replaced");
    }

    /// Send one request and wait for its response (blocking).
    ///
    /// Fails with [`ClientError::Api`] when the server reports errors and
    /// with [`ClientError::ProtocolMismatch`] when the response belongs to a
    /// different request. Errors that leave the stream unusable (closed
    /// socket, I/O failure, ID mismatch) also close the connection.
    pub fn send_request(&mut self, request: &Request) -> Result<Response> {
        let result = self.exchange(request);
        if let Err(err) = &result {
            if err.is_fatal() {
                debug!(%err, "closing connection after fatal error");
                self.close();
            }
        }
        result
    }

    /// Send a request whose side effect may tear the connection down.
    ///
    /// A closed or missing connection counts as success and yields
    /// `Ok(None)`. Used for commands that make the server exit or restart.
    pub fn send_expect_teardown(&mut self, request: &Request) -> Result<Option<Response>> {
        match self.send_request(request) {
            Ok(response) => Ok(Some(response)),
            Err(err) if err.is_teardown() => {
                debug!(
                    id = request.id(),
                    function = request.function(),
                    "connection torn down as expected"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn exchange(&mut self, request: &Request) -> Result<Response> {
        let session = self.session.as_mut().ok_or(ClientError::NotConnected)?;
        let payload = request.to_payload()?;

        debug!(
            id = request.id(),
            module = request.module(),
            function = request.function(),
            bytes = payload.len(),
            "sending request"
        );

        session.writer.get_ref().quick_ack();
        session.writer.send(&payload, self.keystream.as_mut())?;

        session.reader.get_ref().quick_ack();
        let answer = session.reader.read_frame(self.keystream.as_mut())?;

        // The server answers a request it cannot parse with an empty document.
        if answer.len() <= 1 {
            return Err(ClientError::MalformedMessage(format!(
                "server returned an empty response to request {}",
                request.id()
            )));
        }

        let response = Response::from_slice(&answer)?;
        if !response.errors().is_empty() {
            return Err(ClientError::Api(response.errors().to_vec()));
        }

        if response.id() != request.id() {
            warn!(
                expected = request.id(),
                actual = response.id(),
                "response id mismatch"
            );
            return Err(ClientError::ProtocolMismatch {
                expected: request.id(),
                actual: response.id(),
            });
        }

        debug!(id = response.id(), bytes = answer.len(), "received response");
        Ok(response)
    }

    /// Close the socket if one is open. Idempotent.
    ///
    /// The configured password and the current keystream are kept.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            session.close.shutdown();
            debug!("connection closed");
        }
        self.state = ConnectionState::Disconnected;
    }

    /// A handle that can shut the socket down from another thread.
    ///
    /// An exchange blocked on the socket then fails with
    /// [`ClientError::ConnectionClosed`].
    pub fn close_handle(&self) -> Option<CloseHandle> {
        self.session.as_ref().map(|session| session.close.clone())
    }

    /// Create a request with the next ID from this connection's allocator.
    pub fn new_request(&self, module: impl Into<String>, function: impl Into<String>) -> Request {
        Request::new(module, function, &self.ids)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Whether traffic is currently masked.
    pub fn is_encrypted(&self) -> bool {
        self.keystream.is_some()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn ids(&self) -> &Arc<IdAllocator> {
        &self.ids
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("encrypted", &self.keystream.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    fn unused_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn new_connection_is_disconnected() {
        let conn = Connection::new(ConnectionConfig::default(), Arc::new(IdAllocator::new()));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(!conn.is_connected());
        assert!(!conn.is_encrypted());
        assert!(conn.close_handle().is_none());
    }

    #[test]
    fn send_without_socket_is_not_connected() {
        let mut conn = Connection::new(ConnectionConfig::default(), Arc::new(IdAllocator::new()));
        let req = conn.new_request("info", "avs");
        let err = conn.send_request(&req).unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
    }

    #[test]
    fn expect_teardown_swallows_not_connected() {
        let mut conn = Connection::new(ConnectionConfig::default(), Arc::new(IdAllocator::new()));
        let req = conn.new_request("control", "exit");
        assert!(conn.send_expect_teardown(&req).unwrap().is_none());
    }

    #[test]
    fn set_password_toggles_encryption() {
        let mut conn = Connection::new(ConnectionConfig::default(), Arc::new(IdAllocator::new()));
        conn.set_password("debug");
        assert!(conn.is_encrypted());
        conn.set_password("");
        assert!(!conn.is_encrypted());
    }

    #[test]
    fn close_is_idempotent_and_keeps_keystream() {
        let mut conn = Connection::new(ConnectionConfig::default(), Arc::new(IdAllocator::new()));
        conn.set_password("debug");
        conn.close();
        conn.close();
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(conn.is_encrypted());
    }

    #[test]
    fn failed_connect_leaves_disconnected() {
        let config = ConnectionConfig::new("127.0.0.1", unused_port());
        let mut conn = Connection::new(config, Arc::new(IdAllocator::new()));
        let err = conn.reconnect(false).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn new_request_uses_shared_allocator() {
        let ids = Arc::new(IdAllocator::new());
        let a = Connection::new(ConnectionConfig::default(), Arc::clone(&ids));
        let b = Connection::new(ConnectionConfig::default(), Arc::clone(&ids));
        assert_eq!(a.new_request("x", "y").id(), 1);
        assert_eq!(b.new_request("x", "y").id(), 2);
    }

    #[test]
    fn debug_hides_password() {
        let config = ConnectionConfig::default().with_password("changeme");
        let conn = Connection::new(config, Arc::new(IdAllocator::new()));
        assert!(!format!("{conn:?}").contains("changeme"));
    }
}
