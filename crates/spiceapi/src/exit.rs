use std::fmt;
use std::io;

use spiceapi_client::ClientError;
use spiceapi_frame::FrameError;
use spiceapi_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const API_ERROR: i32 = 70;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::HostUnreachable
        | io::ErrorKind::NetworkUnreachable => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { ref source, .. } if is_timeout(source) => {
            CliError::new(TIMEOUT, format!("{context}: {err}"))
        }
        TransportError::Resolve { .. } | TransportError::Connect { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        TransportError::Io(source) => io_error(context, source),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::PayloadTooLarge { .. } | FrameError::EmbeddedTerminator { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Transport(err) => transport_error(context, err),
        ClientError::Frame(err) => frame_error(context, err),
        ClientError::Io(err) => io_error(context, err),
        ClientError::Api(_) => CliError::new(API_ERROR, format!("{context}: {err}")),
        ClientError::MalformedMessage(_) | ClientError::ProtocolMismatch { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        ClientError::NotConnected | ClientError::ConnectionClosed => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_api_code() {
        let err = client_error("call failed", ClientError::Api(vec!["nope".into()]));
        assert_eq!(err.code, API_ERROR);
        assert_eq!(err.message, "call failed: api error: nope");
    }

    #[test]
    fn read_timeout_maps_to_timeout() {
        let io = io::Error::new(io::ErrorKind::WouldBlock, "timed out");
        assert_eq!(client_error("call failed", ClientError::Io(io)).code, TIMEOUT);
    }

    #[test]
    fn refused_connect_maps_to_transport() {
        let err = TransportError::Connect {
            host: "127.0.0.1".into(),
            port: 1,
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert_eq!(
            client_error("connect failed", ClientError::Transport(err)).code,
            TRANSPORT_ERROR
        );
    }

    #[test]
    fn malformed_and_mismatch_map_to_data_invalid() {
        let malformed = ClientError::MalformedMessage("bad".into());
        let mismatch = ClientError::ProtocolMismatch {
            expected: 1,
            actual: 2,
        };
        assert_eq!(client_error("x", malformed).code, DATA_INVALID);
        assert_eq!(client_error("x", mismatch).code, DATA_INVALID);
    }

    #[test]
    fn closed_connection_is_plain_failure() {
        assert_eq!(client_error("x", ClientError::ConnectionClosed).code, FAILURE);
    }
}
