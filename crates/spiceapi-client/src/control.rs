//! Builders for the server's `control` module.
//!
//! `exit`, `restart`, `shutdown` and `reboot` make the server go away,
//! possibly before it answers, so they go through
//! [`Connection::send_expect_teardown`].

use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::connection::Connection;
use crate::error::{ClientError, Result};
use crate::request::Request;
use crate::value::Value;

/// Server module name.
pub const MODULE: &str = "control";

/// Fixed correlation ID of the session-refresh exchange.
///
/// Using it also resets the shared ID allocator to 0, so the IDs of the
/// requests that follow a handshake are reproducible.
pub const SESSION_REFRESH_ID: u64 = 0;

/// Signals the server can be asked to raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Abort,
    FloatingPoint,
    Illegal,
    Interrupt,
    SegmentationFault,
    Terminate,
}

impl Signal {
    pub const ALL: [Signal; 6] = [
        Signal::Abort,
        Signal::FloatingPoint,
        Signal::Illegal,
        Signal::Interrupt,
        Signal::SegmentationFault,
        Signal::Terminate,
    ];

    /// Wire name of the signal.
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Abort => "SIGABRT",
            Signal::FloatingPoint => "SIGFPE",
            Signal::Illegal => "SIGILL",
            Signal::Interrupt => "SIGINT",
            Signal::SegmentationFault => "SIGSEGV",
            Signal::Terminate => "SIGTERM",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signal name that is not in [`Signal::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown signal '{0}'")]
pub struct UnknownSignal(pub String);

impl FromStr for Signal {
    type Err = UnknownSignal;

    /// Case-insensitive, with or without the `SIG` prefix.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("SIG").unwrap_or(&upper);
        Signal::ALL
            .into_iter()
            .find(|signal| &signal.as_str()[3..] == name)
            .ok_or_else(|| UnknownSignal(s.to_string()))
    }
}

/// Negotiate a connection-local session password.
///
/// The server answers with a new password as the sole data element and
/// switches its side of the cipher after sending; this side follows by
/// calling [`Connection::set_password`].
pub fn session_refresh(conn: &mut Connection) -> Result<()> {
    let request = Request::with_id(MODULE, "session_refresh", SESSION_REFRESH_ID, conn.ids());
    let response = conn.send_request(&request)?;

    let password = response
        .data()
        .get(0)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ClientError::MalformedMessage(
                "session_refresh response carries no password".to_string(),
            )
        })?;

    conn.set_password(password);
    info!("session password refreshed");
    Ok(())
}

/// Ask the server process to raise `signal`.
pub fn raise(conn: &mut Connection, signal: Signal) -> Result<()> {
    let request = conn.new_request(MODULE, "raise").with_param(signal.as_str());
    conn.send_request(&request)?;
    Ok(())
}

/// Ask the server process to exit, optionally with an exit code.
///
/// The server only accepts codes that fit a 32-bit signed integer.
pub fn exit(conn: &mut Connection, code: Option<i32>) -> Result<()> {
    let mut request = conn.new_request(MODULE, "exit");
    if let Some(code) = code {
        request.add_param(code);
    }
    expect_teardown(conn, &request)
}

/// Ask the server process to restart itself.
pub fn restart(conn: &mut Connection) -> Result<()> {
    let request = conn.new_request(MODULE, "restart");
    expect_teardown(conn, &request)
}

/// Ask the server host to shut down.
pub fn shutdown(conn: &mut Connection) -> Result<()> {
    let request = conn.new_request(MODULE, "shutdown");
    expect_teardown(conn, &request)
}

/// Ask the server host to reboot.
pub fn reboot(conn: &mut Connection) -> Result<()> {
    let request = conn.new_request(MODULE, "reboot");
    expect_teardown(conn, &request)
}

fn expect_teardown(conn: &mut Connection, request: &Request) -> Result<()> {
    conn.send_expect_teardown(request)?;
    Ok(())
}
