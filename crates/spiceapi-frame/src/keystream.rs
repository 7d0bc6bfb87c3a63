//! RC4 keystream used to mask protocol bytes.
//!
//! The generator is deliberately not seekable: the only way back to the
//! start of the sequence is to build a new one from the key.

use std::fmt;

const STATE_SIZE: usize = 256;

/// Unbounded RC4 keystream.
///
/// Masking is a plain XOR with the next keystream byte, so the same call
/// both encrypts and decrypts as long as both sides consume the stream in
/// the same order.
#[derive(Clone)]
pub struct Keystream {
    state: [u8; STATE_SIZE],
    i: u8,
    j: u8,
}

impl Keystream {
    /// Initialise a keystream from `key` (key-scheduling step).
    ///
    /// Returns `None` for an empty key; an empty password means plaintext.
    pub fn new(key: &[u8]) -> Option<Self> {
        if key.is_empty() {
            return None;
        }

        let mut state = [0u8; STATE_SIZE];
        for (slot, value) in state.iter_mut().zip(0u8..=u8::MAX) {
            *slot = value;
        }

        let mut j = 0u8;
        for i in 0..STATE_SIZE {
            j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
            state.swap(i, j as usize);
        }

        Some(Self { state, i: 0, j: 0 })
    }

    /// Initialise a keystream from the UTF-8 bytes of a password.
    pub fn from_password(password: &str) -> Option<Self> {
        Self::new(password.as_bytes())
    }

    /// Produce the next keystream byte (generation step).
    pub fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.state[self.i as usize]);
        self.state.swap(self.i as usize, self.j as usize);
        let index = self.state[self.i as usize].wrapping_add(self.state[self.j as usize]);
        self.state[index as usize]
    }

    /// Mask or unmask a single byte, advancing the stream by one.
    pub fn mask(&mut self, byte: u8) -> u8 {
        byte ^ self.next_byte()
    }

    /// Mask or unmask `data` in place, one keystream byte per data byte.
    pub fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            *byte = self.mask(*byte);
        }
    }
}

impl Iterator for Keystream {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        Some(self.next_byte())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl fmt::Debug for Keystream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keystream")
            .field("state", &"<redacted>")
            .finish()
    }
}
