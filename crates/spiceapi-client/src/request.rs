use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::IdAllocator;
use crate::message;
use crate::value::Value;

/// A protocol request: one function call on one server module.
///
/// Fields serialize in wire order: `id`, `module`, `function`, `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    id: u64,
    module: String,
    function: String,
    params: Vec<Value>,
}

impl Request {
    /// Create a request with the next ID from `ids` and no parameters.
    pub fn new(module: impl Into<String>, function: impl Into<String>, ids: &IdAllocator) -> Self {
        Self::from_parts(ids.next(), module.into(), function.into())
    }

    /// Create a request with an explicit ID.
    ///
    /// The allocator counter is moved to `id` as well, so requests created
    /// afterwards continue from it.
    pub fn with_id(
        module: impl Into<String>,
        function: impl Into<String>,
        id: u64,
        ids: &IdAllocator,
    ) -> Self {
        Self::from_parts(ids.carry_over(id), module.into(), function.into())
    }

    fn from_parts(id: u64, module: String, function: String) -> Self {
        Self {
            id,
            module,
            function,
            params: Vec::new(),
        }
    }

    /// Append a parameter. Order is preserved on the wire.
    pub fn add_param(&mut self, value: impl Into<Value>) {
        self.params.push(value.into());
    }

    /// Builder form of [`Request::add_param`].
    pub fn with_param(mut self, value: impl Into<Value>) -> Self {
        self.add_param(value);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// JSON payload for this request, without the terminator.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        message::to_payload(self)
    }

    /// Parse a request from the bytes before its terminator.
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        message::decode(payload)
    }
}
