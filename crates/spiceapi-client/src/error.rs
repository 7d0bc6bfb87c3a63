use std::io::ErrorKind;

use spiceapi_frame::FrameError;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An exchange was attempted without an open socket.
    #[error("no active connection")]
    NotConnected,

    /// The remote end closed the socket before a full response arrived.
    #[error("connection was closed")]
    ConnectionClosed,

    /// The response could not be decoded, or the server could not parse the request.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// The response ID does not match the request ID.
    #[error("unexpected response id {actual} (expected {expected})")]
    ProtocolMismatch { expected: u64, actual: u64 },

    /// The server rejected the request.
    #[error("api error: {}", .0.join("; "))]
    Api(Vec<String>),

    /// Transport-level error while connecting.
    #[error("transport error: {0}")]
    Transport(#[from] spiceapi_transport::TransportError),

    /// Frame-level error that is not a connection teardown.
    #[error("frame error: {0}")]
    Frame(FrameError),

    /// Socket I/O error, including timeouts.
    #[error("i/o error: {0}")]
    Io(std::io::Error),
}

impl ClientError {
    /// Whether this error means the connection is gone rather than the request failed.
    ///
    /// Administrative commands that make the server exit treat these as success.
    pub fn is_teardown(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::NotConnected)
    }

    /// Whether the connection must be dropped after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed | Self::ProtocolMismatch { .. } | Self::Frame(_) | Self::Io(_)
        )
    }

    /// The server-supplied error strings, if this is an API error.
    pub fn api_errors(&self) -> Option<&[String]> {
        match self {
            Self::Api(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FrameError> for ClientError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::ConnectionClosed => Self::ConnectionClosed,
            FrameError::Io(io) if is_teardown_kind(io.kind()) => Self::ConnectionClosed,
            FrameError::Io(io) => Self::Io(io),
            other => Self::Frame(other),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedMessage(err.to_string())
    }
}

fn is_teardown_kind(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::NotConnected
            | ErrorKind::UnexpectedEof
    )
}

pub type Result<T> = std::result::Result<T, ClientError>;
