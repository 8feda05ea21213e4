//! Monotonic counters for compiler-generated names
//!
//! SSA temporaries, block labels, interned-string suffixes and scope ids all
//! draw from independent `Sequence` instances so the number spaces never
//! collide.

use serde::{Deserialize, Serialize};

/// A monotonically increasing counter. `next` returns the current value and
/// advances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence(u32);

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value and increments the counter.
    pub fn next(&mut self) -> u32 {
        let res = self.0;
        self.0 += 1;
        res
    }

    /// The value the next call to `next` will return.
    pub fn peek(&self) -> u32 {
        self.0
    }
}
