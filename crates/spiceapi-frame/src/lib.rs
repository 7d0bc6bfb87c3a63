//! Zero-terminated message framing with keystream masking.
//!
//! Every message on the wire is a UTF-8 document followed by exactly one
//! zero byte. When a password is in effect, every byte in both directions
//! (terminator included) is XOR-masked with a single RC4 keystream whose
//! position is shared by the reader and the writer.
//!
//! The reader and writer take the keystream by `&mut` on every call, so the
//! caller owns the one cursor and threads it through send and receive in
//! order.

pub mod codec;
pub mod error;
pub mod keystream;
pub mod reader;
pub mod writer;

pub use codec::{encode_frame, find_terminator, FrameConfig, DEFAULT_MAX_PAYLOAD, TERMINATOR};
pub use error::{FrameError, Result};
pub use keystream::Keystream;
pub use reader::FrameReader;
pub use writer::FrameWriter;
