//! TCP transport for the SpiceAPI remote-control protocol.
//!
//! This is the lowest layer of the workspace. It opens blocking TCP
//! connections tuned for small request/response exchanges (Nagle disabled,
//! short timeouts) and hands back an [`ApiStream`] that everything else
//! builds on.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::{ApiStream, CloseHandle};
pub use tcp::{connect, TcpOptions, DEFAULT_TIMEOUT};
