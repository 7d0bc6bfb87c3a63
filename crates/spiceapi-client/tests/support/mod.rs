#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use spiceapi_client::{Request, Response};
use spiceapi_frame::{FrameReader, FrameWriter, Keystream};

/// Server side of one accepted connection.
///
/// Keeps its own keystream and consumes it in the same order as the client:
/// request bytes first, then response bytes.
pub struct ServerConn {
    reader: FrameReader<TcpStream>,
    writer: FrameWriter<TcpStream>,
    keystream: Option<Keystream>,
}

impl ServerConn {
    fn new(stream: TcpStream, password: &str) -> Self {
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("read timeout should apply");
        let reader_stream = stream.try_clone().expect("stream should clone");
        Self {
            reader: FrameReader::new(reader_stream),
            writer: FrameWriter::new(stream),
            keystream: Keystream::from_password(password),
        }
    }

    pub fn set_password(&mut self, password: &str) {
        self.keystream = Keystream::from_password(password);
    }

    pub fn recv_payload(&mut self) -> Vec<u8> {
        self.reader
            .read_frame(self.keystream.as_mut())
            .expect("server should receive a frame")
            .to_vec()
    }

    pub fn recv_request(&mut self) -> Request {
        let payload = self.recv_payload();
        Request::from_slice(&payload).expect("server should decode the request")
    }

    /// Read exactly `len` bytes off the socket without unmasking them.
    pub fn recv_raw(&mut self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        self.reader
            .get_mut()
            .read_exact(&mut buf)
            .expect("server should read raw bytes");
        buf
    }

    pub fn send_payload(&mut self, payload: &[u8]) {
        self.writer
            .send(payload, self.keystream.as_mut())
            .expect("server should send a frame");
    }

    pub fn reply(&mut self, response: &Response) {
        let payload = response.to_payload().expect("response should encode");
        self.send_payload(&payload);
    }

    /// Write bytes exactly as given: no masking, no terminator.
    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.writer
            .get_mut()
            .write_all(bytes)
            .expect("server should write raw bytes");
    }

    /// Answer the session refresh and switch to `session_password`.
    pub fn handshake(&mut self, session_password: &str) -> Request {
        let request = self.recv_request();
        assert_eq!(request.module(), "control");
        assert_eq!(request.function(), "session_refresh");
        self.reply(&Response::ok(request.id(), vec![session_password]));
        self.set_password(session_password);
        request
    }

    /// Echo the request's params back as data.
    pub fn echo(&mut self) -> Request {
        let request = self.recv_request();
        self.reply(&Response::ok(request.id(), request.params().to_vec()));
        request
    }
}

pub struct MockListener {
    listener: TcpListener,
    password: String,
}

impl MockListener {
    /// Accept the next client; the keystream starts from the listener's password.
    pub fn accept(&self) -> ServerConn {
        let (stream, _) = self.listener.accept().expect("mock server should accept");
        ServerConn::new(stream, &self.password)
    }
}

/// Start a mock server on an ephemeral port and run `handler` on its thread.
pub fn spawn_server<F>(password: &str, handler: F) -> (u16, JoinHandle<()>)
where
    F: FnOnce(MockListener) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("mock server should bind");
    let port = listener.local_addr().expect("bound address").port();
    let mock = MockListener {
        listener,
        password: password.to_string(),
    };
    let handle = thread::spawn(move || handler(mock));
    (port, handle)
}
