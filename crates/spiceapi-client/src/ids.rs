use std::sync::{Mutex, PoisonError};

/// Correlation ID allocator.
///
/// A monotonically increasing counter behind a mutex. Connections share one
/// allocator through an `Arc`; tests build their own to get isolated,
/// predictable IDs.
#[derive(Debug, Default)]
pub struct IdAllocator {
    counter: Mutex<u64>,
}

impl IdAllocator {
    /// Create an allocator whose first ID is 1.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create an allocator whose counter currently holds `value`.
    pub fn starting_at(value: u64) -> Self {
        Self {
            counter: Mutex::new(value),
        }
    }

    /// Allocate the next ID.
    ///
    /// Never returns 0: after `u64::MAX` the counter wraps to 1.
    pub fn next(&self) -> u64 {
        let mut counter = self.counter.lock().unwrap_or_else(PoisonError::into_inner);
        *counter = counter.checked_add(1).unwrap_or(1);
        *counter
    }

    /// Use `id` for the next exchange and move the counter to it.
    ///
    /// Subsequent allocations continue from `id`, so a fixed override makes
    /// the IDs after it reproducible.
    pub fn carry_over(&self, id: u64) -> u64 {
        let mut counter = self.counter.lock().unwrap_or_else(PoisonError::into_inner);
        *counter = id;
        id
    }

    /// The most recently allocated or carried-over ID.
    pub fn current(&self) -> u64 {
        *self.counter.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
