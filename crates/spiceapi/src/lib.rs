//! Client for the SpiceAPI remote-control protocol.
//!
//! SpiceAPI servers accept JSON requests over TCP, optionally masked with a
//! password-keyed RC4 keystream, and answer each one with a JSON response.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP connect with timeouts and socket tuning
//! - [`frame`]: zero-terminated framing and the keystream
//! - [`client`]: connections, requests, responses and the `control` module

/// Re-export transport types.
pub mod transport {
    pub use spiceapi_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use spiceapi_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use spiceapi_client::*;
}

pub use spiceapi_client::{
    ClientError, Connection, ConnectionConfig, IdAllocator, Request, Response, Result, Value,
};
