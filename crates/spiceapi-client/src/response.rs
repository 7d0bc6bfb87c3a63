use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message;
use crate::value::Value;

/// A protocol response.
///
/// Fields serialize in wire order: `id`, `errors`, `data`. All three are
/// required when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    id: u64,
    errors: Vec<String>,
    data: Value,
}

impl Response {
    pub fn new(id: u64, errors: Vec<String>, data: Value) -> Self {
        Self { id, errors, data }
    }

    /// A successful response carrying `data`.
    pub fn ok(id: u64, data: impl Into<Value>) -> Self {
        Self::new(id, Vec::new(), data.into())
    }

    /// Parse a response from the bytes before its terminator.
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        message::decode(payload)
    }

    /// JSON payload for this response, without the terminator.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        message::to_payload(self)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Server-supplied error strings, in order. Empty on success.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
