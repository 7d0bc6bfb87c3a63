//! Request/response client for the SpiceAPI remote-control protocol.
//!
//! This is the "just works" layer. Open a [`Connection`], build
//! [`Request`]s, and get validated [`Response`]s back. Encryption, session
//! refresh and correlation checks happen underneath.
//!
//! ```no_run
//! use spiceapi_client::{Connection, ConnectionConfig};
//!
//! # fn main() -> spiceapi_client::Result<()> {
//! let config = ConnectionConfig::new("127.0.0.1", 1337).with_password("changeme");
//! let mut conn = Connection::connect(config)?;
//!
//! let request = conn.new_request("coin", "insert").with_param(1);
//! let response = conn.send_request(&request)?;
//! println!("{}", response.data());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod control;
pub mod error;
pub mod ids;
pub mod message;
pub mod request;
pub mod response;
pub mod value;

pub use config::{ConnectionConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use connection::{Connection, ConnectionState};
pub use error::{ClientError, Result};
pub use ids::IdAllocator;
pub use request::Request;
pub use response::Response;
pub use value::Value;
